// src/utils/username.rs

/// Latin spelling of a single lower-case character. Unknown characters pass through.
fn transliterate_char(c: char) -> Option<&'static str> {
    let latin = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' | 'ё' => "e",
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
        'щ' => "shch",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        'ъ' | 'ь' => "",
        ' ' => "_",
        _ => return None,
    };
    Some(latin)
}

/// Lower-cases `text` and spells Cyrillic letters in Latin.
pub fn transliterate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        match transliterate_char(c) {
            Some(latin) => out.push_str(latin),
            None => out.push(c),
        }
    }
    out
}

fn first_char(text: &str) -> &str {
    match text.char_indices().nth(1) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

/// Builds a login from initials and surname: "Данила Витальевич Гусаков" -> "dvgusakov".
///
/// Computed once at registration and stored; never recomputed on later edits.
pub fn generate_username(first_name: &str, middle_name: Option<&str>, last_name: &str) -> String {
    let mut username = transliterate(first_char(first_name.trim()));
    if let Some(middle) = middle_name {
        username.push_str(&transliterate(first_char(middle.trim())));
    }
    username.push_str(&transliterate(last_name.trim()));
    username
}
