//! `{placeholder}` rendering for character templates.

/// Replace each `{name}` in `template` with its value.
/// Placeholders without a value are left as-is.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{}}}", name), value);
    }
    out
}

/// Format a kilogram amount, always keeping at least one decimal place.
pub fn format_kg(kg: f64) -> String {
    if kg.fract() == 0.0 {
        format!("{:.1}", kg)
    } else {
        format!("{}", kg)
    }
}
