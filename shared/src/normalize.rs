//! Lookup-key normalization for crop and soil names
//!
//! Field records carry crop and soil names as typed by farmers, often in
//! Turkish ("Buğday", "Kumlu Tın") with arbitrary case and spacing. Every
//! reference-table lookup goes through [`normalize_key`] so that all of these
//! spellings resolve to the same entry.

/// Canonicalize a display name into a lookup key.
///
/// Lower-cases, folds accented Latin letters to ASCII, treats `-`/`_` as
/// spaces and collapses runs of whitespace. The function is total and
/// idempotent.
pub fn normalize_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    let mut pending_space = false;

    let chars = name
        .chars()
        .flat_map(fold_char)
        .flat_map(char::to_lowercase)
        .flat_map(fold_char);

    for c in chars {
        if c.is_whitespace() || c == '-' || c == '_' {
            pending_space = !key.is_empty();
            continue;
        }
        if pending_space {
            key.push(' ');
            pending_space = false;
        }
        key.push(c);
    }

    key
}

/// Fold a single character to its unaccented lower-case form.
///
/// Handled explicitly rather than through Unicode decomposition because the
/// Turkish dotless `ı` and dotted `İ` have no ASCII decomposition.
fn fold_char(c: char) -> impl Iterator<Item = char> {
    let folded: &'static str = match c {
        'ç' | 'Ç' | 'ć' | 'Ć' | 'č' | 'Č' => "c",
        'ğ' | 'Ğ' | 'ĝ' | 'Ĝ' => "g",
        'ı' | 'İ' | 'í' | 'Í' | 'ì' | 'Ì' | 'î' | 'Î' | 'ï' | 'Ï' => "i",
        'ö' | 'Ö' | 'ó' | 'Ó' | 'ò' | 'Ò' | 'ô' | 'Ô' | 'õ' | 'Õ' | 'ø' | 'Ø' => "o",
        'ş' | 'Ş' | 'ś' | 'Ś' | 'š' | 'Š' => "s",
        'ü' | 'Ü' | 'ú' | 'Ú' | 'ù' | 'Ù' | 'û' | 'Û' => "u",
        'á' | 'Á' | 'à' | 'À' | 'â' | 'Â' | 'ä' | 'Ä' | 'ã' | 'Ã' | 'å' | 'Å' => "a",
        'é' | 'É' | 'è' | 'È' | 'ê' | 'Ê' | 'ë' | 'Ë' => "e",
        'ñ' | 'Ñ' => "n",
        'ý' | 'Ý' | 'ÿ' => "y",
        'ž' | 'Ž' | 'ź' | 'Ź' | 'ż' | 'Ż' => "z",
        'ß' => "ss",
        'æ' | 'Æ' => "ae",
        _ => "",
    };

    let single = if folded.is_empty() { Some(c) } else { None };
    folded.chars().chain(single)
}
