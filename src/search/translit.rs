use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// Lowercase `text`, drop diacritics and spell Cyrillic in Latin letters.
/// Works per grapheme cluster so decomposed accents ("e\u{301}") fold the
/// same way as precomposed ones ("é").
pub fn transliterate(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut out = String::with_capacity(lower.len());

    for grapheme in lower.graphemes(true) {
        let mut chars = grapheme.chars();
        match chars.next().and_then(fold_char) {
            Some(latin) => {
                out.push_str(latin);
                push_stripped(&mut out, chars.as_str());
            }
            None => push_stripped(&mut out, grapheme),
        }
    }

    out
}

// Clusters without marks are kept whole, so Hangul syllables are not split
// into jamo.
fn push_stripped(out: &mut String, cluster: &str) {
    if cluster.nfd().any(is_combining_mark) {
        out.extend(cluster.nfd().filter(|c| !is_combining_mark(*c)));
    } else {
        out.push_str(cluster);
    }
}

/// The transliterated form of `text`, or `None` when it adds nothing beyond
/// lowercasing.
pub fn transliterated_variant(text: &str) -> Option<String> {
    let translit = transliterate(text);
    if translit.is_empty() || translit == text.to_lowercase() {
        None
    } else {
        Some(translit)
    }
}

/// Letters that canonical decomposition leaves alone: Cyrillic, and Latin
/// letters whose stroke or ligature is part of the base character.
fn fold_char(c: char) -> Option<&'static str> {
    let folded = match c {
        // Russian
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        // Ukrainian / Belarusian
        'і' => "i",
        'ї' => "yi",
        'є' => "ye",
        'ґ' => "g",
        'ў' => "u",
        // Latin letters without a canonical decomposition
        'đ' => "d",
        'ł' => "l",
        'ø' => "o",
        'ß' => "ss",
        'æ' => "ae",
        'œ' => "oe",
        _ => return None,
    };
    Some(folded)
}
