use showwork_core::CoreError;
use showwork_model::Category;
use showwork_query::{DirectoryFilter, DirectoryLimits, DirectorySort};
use std::collections::BTreeMap;

/// Builds a directory filter from raw query-string pairs. Unknown keys are
/// rejected so typos like `?catgory=` fail loudly instead of returning the
/// unfiltered listing.
pub(crate) fn directory_filter(
    raw: &BTreeMap<String, String>,
    limits: &DirectoryLimits,
) -> Result<DirectoryFilter, CoreError> {
    let mut filter = DirectoryFilter {
        limit: limits.default_limit,
        ..Default::default()
    };
    for (key, value) in raw {
        match key.as_str() {
            "category" => filter.category = Some(Category::parse(value)?),
            "skill" => filter.skill = Some(value.clone()),
            "sort" => filter.sort = DirectorySort::parse(value)?,
            "limit" => filter.limit = parse_usize("limit", value)?,
            "offset" => filter.offset = parse_usize("offset", value)?,
            other => {
                return Err(CoreError::validation(format!(
                    "unknown query parameter: {other}"
                )));
            }
        }
    }
    Ok(filter)
}

fn parse_usize(name: &str, raw: &str) -> Result<usize, CoreError> {
    raw.parse::<usize>()
        .map_err(|_| CoreError::validation(format!("{name} must be a non-negative integer")))
}
