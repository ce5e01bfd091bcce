use crate::error::CoreError;

pub const MAX_DESCRIPTION_CHARS: usize = 255;

pub fn validate_description(description: &str) -> Result<(), CoreError> {
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_CHARS {
        return Err(CoreError::DescriptionTooLong {
            len,
            max: MAX_DESCRIPTION_CHARS,
        });
    }
    Ok(())
}

/// Pull `#tag` keywords out of a description, in order of appearance.
///
/// Words are split on single spaces. Only the leading `#` is stripped, so
/// `##rust` yields `#rust`. A bare `#` carries no tag and is skipped.
pub fn extract_tags(description: &str) -> Vec<String> {
    description
        .split(' ')
        .filter_map(|word| word.strip_prefix('#'))
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
