use std::collections::BTreeMap;

use crate::error::ConfigError;

/// Substitutes `${NAME}` from `vars`. `$$` yields a literal `$`, any other
/// `$` is copied as is. Unknown names are an error.
///
/// # Errors
///
/// Returns an error for an unknown variable or an unterminated `${`.
pub fn render(text: &str, vars: &BTreeMap<String, String>) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut consumed = 0usize;
    while let Some(pos) = rest.find('$') {
        let (before, tail) = rest.split_at(pos);
        out.push_str(before);
        let after = tail.get(1..).unwrap_or("");
        if let Some(next) = after.strip_prefix('$') {
            out.push('$');
            consumed = consumed.saturating_add(pos).saturating_add(2);
            rest = next;
        } else if let Some(body) = after.strip_prefix('{') {
            let offset = consumed.saturating_add(pos);
            let end = body
                .find('}')
                .ok_or(ConfigError::UnterminatedPlaceholder { offset })?;
            let name = body.get(..end).unwrap_or("");
            let value = vars.get(name).ok_or_else(|| ConfigError::MissingTemplateVar {
                name: name.to_owned(),
            })?;
            out.push_str(value);
            let skipped = end.saturating_add(3);
            consumed = offset.saturating_add(skipped);
            rest = body.get(end.saturating_add(1)..).unwrap_or("");
        } else {
            out.push('$');
            consumed = consumed.saturating_add(pos).saturating_add(1);
            rest = after;
        }
    }
    out.push_str(rest);
    Ok(out)
}
