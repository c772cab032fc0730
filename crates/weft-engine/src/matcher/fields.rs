use crate::reducer::ReducedRecording;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use weft_common::recording::{ActionKind, CapturedInput};

/// What role a captured field plays in the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    /// Login identifier: email, username.
    Identifier,
    /// Login secret. Its literal value must never survive into a spec.
    Secret,
    /// Recognized business value, carrying its canonical param name.
    Business(&'static str),
    /// Unrecognized field with a non-empty value. Still becomes a param
    /// so every variable-bearing field is represented.
    Generic,
}

/// One classified field with its final captured value.
#[derive(Debug, Clone)]
pub struct Classification {
    pub field: String,
    pub class: FieldClass,
    pub param_name: String,
    pub value: String,
}

impl Classification {
    pub fn is_sensitive(&self) -> bool {
        matches!(self.class, FieldClass::Identifier | FieldClass::Secret)
    }
}

const SECRET_HINTS: &[&str] = &["password", "pwd"];
const IDENTIFIER_HINTS: &[&str] = &["email", "username", "login", "user"];

/// Domain-specific substrings mapped to canonical param names. Ordered:
/// first match wins, so compound keys sit above their prefixes.
const BUSINESS_HINTS: &[(&str, &str)] = &[
    ("item_name", "ITEM_NAME"),
    ("product", "ITEM_NAME"),
    ("item", "ITEM_NAME"),
    ("price", "PRICE"),
    ("cost", "PRICE"),
    ("amount", "PRICE"),
    ("quantity", "QUANTITY"),
    ("sku", "SKU"),
    ("search", "SEARCH_QUERY"),
    ("query", "SEARCH_QUERY"),
];

fn param_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Z0-9]+").expect("static pattern"))
}

/// Deterministic generic param name for an unrecognized field key:
/// upper-cased, runs of non-alphanumerics collapsed to underscores.
pub fn generic_param_name(field_key: &str) -> String {
    let upper = field_key.to_uppercase();
    let name = param_key_regex()
        .replace_all(&upper, "_")
        .trim_matches('_')
        .to_string();
    if name.is_empty() { "FIELD".into() } else { name }
}

fn contains_any(haystacks: &[Option<&str>], needles: &[&str]) -> bool {
    haystacks.iter().flatten().any(|h| {
        let lower = h.to_lowercase();
        needles.iter().any(|n| lower.contains(n))
    })
}

/// Classification policy, priority order, first match wins:
/// explicit capture-layer tag, then secret/identifier hints, then the
/// business table, then generic for any field with a value.
fn classify_one(
    field_key: &str,
    hints: &[Option<&str>],
    element_type: Option<&str>,
    captured: Option<&CapturedInput>,
    value: &str,
) -> Option<FieldClass> {
    if let Some(input) = captured
        && input.is_login_field
    {
        let secret = input.input_type.as_deref() == Some("password");
        return Some(if secret {
            FieldClass::Secret
        } else {
            FieldClass::Identifier
        });
    }

    let mut sources: Vec<Option<&str>> = vec![Some(field_key)];
    sources.extend_from_slice(hints);

    if element_type == Some("password") || contains_any(&sources, SECRET_HINTS) {
        return Some(FieldClass::Secret);
    }
    if contains_any(&sources, IDENTIFIER_HINTS) {
        return Some(FieldClass::Identifier);
    }
    for &(hint, canonical) in BUSINESS_HINTS {
        if contains_any(&sources, &[hint]) {
            return Some(FieldClass::Business(canonical));
        }
    }
    if !value.is_empty() {
        return Some(FieldClass::Generic);
    }
    None
}

fn base_param_name(class: FieldClass, field_key: &str) -> String {
    match class {
        FieldClass::Identifier => "USERNAME".into(),
        FieldClass::Secret => "PASSWORD".into(),
        FieldClass::Business(name) => name.into(),
        FieldClass::Generic => generic_param_name(field_key),
    }
}

/// Classifies every variable-bearing field of a reduced recording.
///
/// Fields are discovered in action order first, then from the captured
/// input side channel (ordered map, so the result is stable). The side
/// channel value wins over the last observed action value.
pub fn classify_fields(reduced: &ReducedRecording) -> Vec<Classification> {
    // field key -> index into out, for final-value updates
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<Classification> = Vec::new();
    // param name -> value, for collision suffixing
    let mut taken: HashMap<String, String> = HashMap::new();

    let push = |key: &str,
                hints: &[Option<&str>],
                element_type: Option<&str>,
                observed_value: Option<&str>,
                seen: &mut HashMap<String, usize>,
                out: &mut Vec<Classification>,
                taken: &mut HashMap<String, String>| {
        let captured = reduced.captured_inputs.get(key);
        let value = captured
            .map(|c| c.value.clone())
            .or_else(|| observed_value.map(str::to_string))
            .unwrap_or_default();

        if let Some(&idx) = seen.get(key) {
            // Later observation of a known field refreshes its final
            // value unless the side channel already pinned it.
            if captured.is_none() && !value.is_empty() {
                out[idx].value = value;
            }
            return;
        }

        let Some(class) = classify_one(key, hints, element_type, captured, &value) else {
            return;
        };

        let base = base_param_name(class, key);
        let mut param_name = base.clone();
        let mut suffix = 2;
        while let Some(existing) = taken.get(&param_name) {
            if *existing == value {
                // Same value, same variable: reuse the placeholder.
                break;
            }
            param_name = format!("{base}_{suffix}");
            suffix += 1;
        }
        taken.insert(param_name.clone(), value.clone());
        seen.insert(key.to_string(), out.len());
        out.push(Classification {
            field: key.to_string(),
            class,
            param_name,
            value,
        });
    };

    for action in &reduced.actions {
        if !(action.kind.is_input_like() || action.kind == ActionKind::Select) {
            continue;
        }
        let Some(key) = action.field_key() else {
            continue;
        };
        let key = key.to_string();
        let hints = [
            action.id.as_deref(),
            action.name.as_deref(),
            action.placeholder.as_deref(),
        ];
        push(
            &key,
            &hints,
            action.element_type.as_deref(),
            action.value.as_deref(),
            &mut seen,
            &mut out,
            &mut taken,
        );
    }

    for (key, input) in &reduced.captured_inputs {
        if seen.contains_key(key) {
            continue;
        }
        let hints = [Some(input.field.as_str())];
        push(
            key,
            &hints,
            input.input_type.as_deref(),
            Some(input.value.as_str()),
            &mut seen,
            &mut out,
            &mut taken,
        );
    }

    // A classified field with no value cannot bind a param.
    out.retain(|c| !c.value.is_empty());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_param_name_is_deterministic() {
        assert_eq!(generic_param_name("billing-zip.code"), "BILLING_ZIP_CODE");
        assert_eq!(generic_param_name("__x__"), "X");
        assert_eq!(generic_param_name("!!!"), "FIELD");
    }

    #[test]
    fn explicit_capture_tag_beats_name_hints() {
        // Field named "price" but tagged as a login field by the
        // capture layer: the side channel wins.
        let captured = CapturedInput {
            field: "price".into(),
            value: "hunter2".into(),
            input_type: Some("password".into()),
            is_login_field: true,
            url: None,
        };
        let class = classify_one("price", &[], None, Some(&captured), "hunter2");
        assert_eq!(class, Some(FieldClass::Secret));
    }

    #[test]
    fn hint_tables_split_secret_from_identifier() {
        assert_eq!(
            classify_one("user_email", &[], None, None, "a@b.c"),
            Some(FieldClass::Identifier)
        );
        assert_eq!(
            classify_one("pwd_confirm", &[], None, None, "x"),
            Some(FieldClass::Secret)
        );
        assert_eq!(
            classify_one("item_name", &[], None, None, "Widget"),
            Some(FieldClass::Business("ITEM_NAME"))
        );
    }

    #[test]
    fn valueless_unrecognized_field_is_skipped() {
        assert_eq!(classify_one("mystery", &[], None, None, ""), None);
        assert_eq!(
            classify_one("mystery", &[], None, None, "42"),
            Some(FieldClass::Generic)
        );
    }
}
