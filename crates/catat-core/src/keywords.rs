//! Built-in keyword table and the static matching tiers
//!
//! The table is compiled in and read-only. Entry order matters: the
//! substring tier returns the first entry that qualifies, so entries are
//! grouped by category and new ones should be appended, not inserted.

use crate::fuzzy::{find_best_match, DEFAULT_THRESHOLD};
use crate::models::Category;

/// Substring and fuzzy tiers ignore anything shorter than this
pub const MIN_PARTIAL_LEN: usize = 3;

/// Lowercase keyword → category, in lookup order
pub static KEYWORDS: &[(&str, Category)] = &[
    // Food
    ("makan", Category::Food),
    ("makanan", Category::Food),
    ("sarapan", Category::Food),
    ("bakso", Category::Food),
    ("baso", Category::Food),
    ("mie", Category::Food),
    ("indomie", Category::Food),
    ("nasi", Category::Food),
    ("soto", Category::Food),
    ("sate", Category::Food),
    ("ayam", Category::Food),
    ("geprek", Category::Food),
    ("bubur", Category::Food),
    ("pecel", Category::Food),
    ("martabak", Category::Food),
    ("gorengan", Category::Food),
    ("seblak", Category::Food),
    ("roti", Category::Food),
    ("kopi", Category::Food),
    ("teh", Category::Food),
    ("boba", Category::Food),
    ("susu", Category::Food),
    ("minum", Category::Food),
    ("minuman", Category::Food),
    ("jajan", Category::Food),
    ("snack", Category::Food),
    ("warteg", Category::Food),
    ("warung", Category::Food),
    ("padang", Category::Food),
    ("resto", Category::Food),
    ("restoran", Category::Food),
    ("kafe", Category::Food),
    ("cafe", Category::Food),
    ("pizza", Category::Food),
    ("burger", Category::Food),
    ("kfc", Category::Food),
    ("mcd", Category::Food),
    ("gofood", Category::Food),
    ("grabfood", Category::Food),
    ("shopeefood", Category::Food),
    ("beras", Category::Food),
    ("sayur", Category::Food),
    ("buah", Category::Food),
    // Transport
    ("bensin", Category::Transport),
    ("pertalite", Category::Transport),
    ("pertamax", Category::Transport),
    ("solar", Category::Transport),
    ("bbm", Category::Transport),
    ("spbu", Category::Transport),
    ("parkir", Category::Transport),
    ("tol", Category::Transport),
    ("ojek", Category::Transport),
    ("ojol", Category::Transport),
    ("gojek", Category::Transport),
    ("goride", Category::Transport),
    ("gocar", Category::Transport),
    ("grab", Category::Transport),
    ("grabcar", Category::Transport),
    ("maxim", Category::Transport),
    ("taksi", Category::Transport),
    ("taxi", Category::Transport),
    ("angkot", Category::Transport),
    ("bus", Category::Transport),
    ("busway", Category::Transport),
    ("transjakarta", Category::Transport),
    ("krl", Category::Transport),
    ("mrt", Category::Transport),
    ("lrt", Category::Transport),
    ("kereta", Category::Transport),
    ("pesawat", Category::Transport),
    ("bengkel", Category::Transport),
    ("servis", Category::Transport),
    // Bills
    ("listrik", Category::Bills),
    ("pln", Category::Bills),
    ("token", Category::Bills),
    ("air", Category::Bills),
    ("pdam", Category::Bills),
    ("internet", Category::Bills),
    ("wifi", Category::Bills),
    ("indihome", Category::Bills),
    ("pulsa", Category::Bills),
    ("kuota", Category::Bills),
    ("tagihan", Category::Bills),
    ("cicilan", Category::Bills),
    ("kredit", Category::Bills),
    ("asuransi", Category::Bills),
    ("bpjs", Category::Bills),
    ("iuran", Category::Bills),
    ("sewa", Category::Bills),
    ("kos", Category::Bills),
    ("kost", Category::Bills),
    ("kontrakan", Category::Bills),
    ("pajak", Category::Bills),
    ("telepon", Category::Bills),
    // Shopping
    ("belanja", Category::Shopping),
    ("baju", Category::Shopping),
    ("celana", Category::Shopping),
    ("kaos", Category::Shopping),
    ("jaket", Category::Shopping),
    ("sepatu", Category::Shopping),
    ("sandal", Category::Shopping),
    ("tas", Category::Shopping),
    ("shopee", Category::Shopping),
    ("tokopedia", Category::Shopping),
    ("tokped", Category::Shopping),
    ("lazada", Category::Shopping),
    ("indomaret", Category::Shopping),
    ("alfamart", Category::Shopping),
    ("supermarket", Category::Shopping),
    ("minimarket", Category::Shopping),
    ("sabun", Category::Shopping),
    ("sampo", Category::Shopping),
    ("skincare", Category::Shopping),
    ("kosmetik", Category::Shopping),
    ("buku", Category::Shopping),
    ("mainan", Category::Shopping),
    ("elektronik", Category::Shopping),
    ("laptop", Category::Shopping),
    ("charger", Category::Shopping),
    ("perabot", Category::Shopping),
    ("kasur", Category::Shopping),
    // Entertainment
    ("nonton", Category::Entertainment),
    ("bioskop", Category::Entertainment),
    ("film", Category::Entertainment),
    ("netflix", Category::Entertainment),
    ("spotify", Category::Entertainment),
    ("youtube", Category::Entertainment),
    ("disney", Category::Entertainment),
    ("game", Category::Entertainment),
    ("steam", Category::Entertainment),
    ("konser", Category::Entertainment),
    ("karaoke", Category::Entertainment),
    ("liburan", Category::Entertainment),
    ("wisata", Category::Entertainment),
    ("hotel", Category::Entertainment),
    ("hiburan", Category::Entertainment),
    ("gym", Category::Entertainment),
    ("futsal", Category::Entertainment),
    ("renang", Category::Entertainment),
    // Income
    ("gaji", Category::Income),
    ("gajian", Category::Income),
    ("bonus", Category::Income),
    ("thr", Category::Income),
    ("honor", Category::Income),
    ("komisi", Category::Income),
    ("dividen", Category::Income),
    ("freelance", Category::Income),
    ("penjualan", Category::Income),
    ("cashback", Category::Income),
    ("refund", Category::Income),
    ("pemasukan", Category::Income),
];

/// A keyword table hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeywordHit {
    pub keyword: &'static str,
    pub category: Category,
    /// Only set by the fuzzy tier
    pub similarity: Option<f64>,
}

impl KeywordHit {
    fn new(keyword: &'static str, category: Category) -> Self {
        Self {
            keyword,
            category,
            similarity: None,
        }
    }
}

fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Exact, case-insensitive table lookup
pub fn exact_match(word: &str) -> Option<KeywordHit> {
    let word = normalize(word);
    KEYWORDS
        .iter()
        .find(|(keyword, _)| *keyword == word)
        .map(|&(keyword, category)| KeywordHit::new(keyword, category))
}

/// First table entry where either string contains the other
///
/// Both sides must be at least [`MIN_PARTIAL_LEN`] characters, so short
/// words like "air" do not fire inside unrelated longer words.
pub fn substring_match(word: &str) -> Option<KeywordHit> {
    let word = normalize(word);
    if word.chars().count() < MIN_PARTIAL_LEN {
        return None;
    }

    KEYWORDS
        .iter()
        .filter(|(keyword, _)| keyword.chars().count() >= MIN_PARTIAL_LEN)
        .find(|(keyword, _)| word.contains(keyword) || keyword.contains(word.as_str()))
        .map(|&(keyword, category)| KeywordHit::new(keyword, category))
}

/// Closest table entry by edit distance, at similarity >= 0.7
pub fn fuzzy_match(word: &str) -> Option<KeywordHit> {
    let word = normalize(word);
    if word.chars().count() < MIN_PARTIAL_LEN {
        return None;
    }

    let candidates: Vec<&str> = KEYWORDS.iter().map(|(keyword, _)| *keyword).collect();
    let found = find_best_match(&word, &candidates, DEFAULT_THRESHOLD)?;

    KEYWORDS
        .iter()
        .find(|(keyword, _)| *keyword == found.candidate)
        .map(|&(keyword, category)| KeywordHit {
            keyword,
            category,
            similarity: Some(found.similarity),
        })
}

/// Resolve a single word against the built-in table only
///
/// Tries exact, then substring, then fuzzy; the first tier with a hit wins.
pub fn categorize_word_sync(word: &str) -> Option<Category> {
    exact_match(word)
        .or_else(|| substring_match(word))
        .or_else(|| fuzzy_match(word))
        .map(|hit| hit.category)
}
