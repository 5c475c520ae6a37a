use crate::transcription::domain::transliterator::Transliterator;

const VIRAMA: char = '\u{094D}';
const NUKTA: char = '\u{093C}';
const INHERENT_VOWEL: &str = "a";

/// Devanagari to ITRANS romanization.
///
/// Consonants carry an inherent `a` unless followed by a virama or a vowel
/// sign. Characters outside the Devanagari block pass through unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct DevanagariTransliterator;

impl Transliterator for DevanagariTransliterator {
    fn transliterate(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() * 2);
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            let Some(consonant) = consonant(c) else {
                match other_sign(c) {
                    Some(latin) => out.push_str(latin),
                    None => out.push(c),
                }
                continue;
            };

            let consonant = if chars.peek() == Some(&NUKTA) {
                chars.next();
                nukta_form(c).unwrap_or(consonant)
            } else {
                consonant
            };
            out.push_str(consonant);

            match chars.peek().copied() {
                Some(VIRAMA) => {
                    chars.next();
                }
                Some(next) => match vowel_sign(next) {
                    Some(vowel) => {
                        chars.next();
                        out.push_str(vowel);
                    }
                    None => out.push_str(INHERENT_VOWEL),
                },
                None => out.push_str(INHERENT_VOWEL),
            }
        }

        out
    }
}

fn consonant(c: char) -> Option<&'static str> {
    let latin = match c {
        '\u{0915}' => "k",
        '\u{0916}' => "kh",
        '\u{0917}' => "g",
        '\u{0918}' => "gh",
        '\u{0919}' => "~N",
        '\u{091A}' => "ch",
        '\u{091B}' => "Ch",
        '\u{091C}' => "j",
        '\u{091D}' => "jh",
        '\u{091E}' => "~n",
        '\u{091F}' => "T",
        '\u{0920}' => "Th",
        '\u{0921}' => "D",
        '\u{0922}' => "Dh",
        '\u{0923}' => "N",
        '\u{0924}' => "t",
        '\u{0925}' => "th",
        '\u{0926}' => "d",
        '\u{0927}' => "dh",
        '\u{0928}' => "n",
        '\u{092A}' => "p",
        '\u{092B}' => "ph",
        '\u{092C}' => "b",
        '\u{092D}' => "bh",
        '\u{092E}' => "m",
        '\u{092F}' => "y",
        '\u{0930}' => "r",
        '\u{0932}' => "l",
        '\u{0933}' => "L",
        '\u{0935}' => "v",
        '\u{0936}' => "sh",
        '\u{0937}' => "Sh",
        '\u{0938}' => "s",
        '\u{0939}' => "h",
        // Precomposed nukta consonants.
        '\u{0958}' => "q",
        '\u{0959}' => "K",
        '\u{095A}' => "G",
        '\u{095B}' => "z",
        '\u{095C}' => ".D",
        '\u{095D}' => ".Dh",
        '\u{095E}' => "f",
        '\u{095F}' => "Y",
        _ => return None,
    };
    Some(latin)
}

/// Consonant followed by a combining nukta.
fn nukta_form(c: char) -> Option<&'static str> {
    let latin = match c {
        '\u{0915}' => "q",
        '\u{0916}' => "K",
        '\u{0917}' => "G",
        '\u{091C}' => "z",
        '\u{0921}' => ".D",
        '\u{0922}' => ".Dh",
        '\u{092B}' => "f",
        '\u{092F}' => "Y",
        _ => return None,
    };
    Some(latin)
}

fn vowel_sign(c: char) -> Option<&'static str> {
    let latin = match c {
        '\u{093E}' => "A",
        '\u{093F}' => "i",
        '\u{0940}' => "I",
        '\u{0941}' => "u",
        '\u{0942}' => "U",
        '\u{0943}' => "RRi",
        '\u{0944}' => "RRI",
        '\u{0947}' => "e",
        '\u{0948}' => "ai",
        '\u{094B}' => "o",
        '\u{094C}' => "au",
        _ => return None,
    };
    Some(latin)
}

/// Independent vowels, nasal and aspiration marks, punctuation and digits.
fn other_sign(c: char) -> Option<&'static str> {
    let latin = match c {
        '\u{0905}' => "a",
        '\u{0906}' => "A",
        '\u{0907}' => "i",
        '\u{0908}' => "I",
        '\u{0909}' => "u",
        '\u{090A}' => "U",
        '\u{090B}' => "RRi",
        '\u{0960}' => "RRI",
        '\u{090C}' => "LLi",
        '\u{090F}' => "e",
        '\u{0910}' => "ai",
        '\u{0913}' => "o",
        '\u{0914}' => "au",
        '\u{0901}' => ".N",
        '\u{0902}' => "M",
        '\u{0903}' => "H",
        '\u{093D}' => ".a",
        '\u{0950}' => "OM",
        '\u{0964}' => "|",
        '\u{0965}' => "||",
        // A stray vowel sign or virama with no consonant before it.
        '\u{093E}'..='\u{094D}' => vowel_sign(c).unwrap_or(""),
        '\u{0966}'..='\u{096F}' => DIGITS[(c as u32 - 0x0966) as usize],
        _ => return None,
    };
    Some(latin)
}

const DIGITS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];
