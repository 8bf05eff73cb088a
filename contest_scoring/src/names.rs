use crate::config::*;
use log::debug;
use pinyin::ToPinyin;

/// Length of the longest common subsequence of two strings, compared char by char.
pub fn lcs_length(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut table = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for i in 0..a.len() {
        for j in 0..b.len() {
            table[i + 1][j + 1] = if a[i] == b[j] {
                table[i][j] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }
    table[a.len()][b.len()]
}

/// Dice-style similarity built on [lcs_length], between 0 and 1.
pub fn similarity(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }
    (2 * lcs_length(a, b)) as f64 / total as f64
}

/// The first letter of the pinyin reading of a character, or the character
/// itself when it has none.
fn char_initial(c: char) -> String {
    match c.to_pinyin() {
        Some(p) => p.first_letter().to_string(),
        None => c.to_string(),
    }
}

/// Generates name initials, with the known surnames spelled out correctly.
pub struct NameMatcher {
    surnames: SurnameTable,
}

impl NameMatcher {
    pub fn new(surnames: SurnameTable) -> NameMatcher {
        debug!("NameMatcher::new: {} surnames", surnames.len());
        NameMatcher { surnames }
    }

    /// One initial per name unit.
    ///
    /// The longest prefix of the name found in the surname table replaces the
    /// leading units with the initials given by the table.
    pub fn initial_list(&self, name: &str) -> Vec<String> {
        let chars: Vec<char> = name.chars().collect();
        let mut initials: Vec<String> = chars.iter().map(|c| char_initial(*c)).collect();
        for len in (1..=chars.len()).rev() {
            let prefix: String = chars[..len].iter().collect();
            if let Some(surname) = self.surnames.get(&prefix) {
                let mut fixed: Vec<String> = surname.chars().map(|c| c.to_string()).collect();
                fixed.extend(initials.drain(len..));
                initials = fixed;
                break;
            }
        }
        initials
    }

    pub fn romanized_initials(&self, name: &str) -> String {
        self.initial_list(name).concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> NameMatcher {
        let mut surnames = SurnameTable::new();
        surnames.insert("单".to_string(), "s".to_string());
        surnames.insert("曾".to_string(), "z".to_string());
        surnames.insert("尉迟".to_string(), "yc".to_string());
        surnames.insert("单于".to_string(), "cy".to_string());
        NameMatcher::new(surnames)
    }

    #[test]
    fn lcs_textbook_example() {
        assert_eq!(lcs_length("ABCBDAB", "BDCABA"), 4);
    }

    #[test]
    fn lcs_is_symmetric() {
        let words = ["", "A", "ABCBDAB", "BDCABA", "张三", "张小三", "三张", "xyz"];
        for a in words.iter() {
            for b in words.iter() {
                assert_eq!(lcs_length(a, b), lcs_length(b, a), "{} / {}", a, b);
            }
        }
    }

    #[test]
    fn lcs_on_chinese_names() {
        assert_eq!(lcs_length("张小三", "张三"), 2);
        assert_eq!(lcs_length("张三", "李四"), 0);
        assert_eq!(lcs_length("", "李四"), 0);
    }

    #[test]
    fn similarity_bounds() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("张三", "张三"), 1.0);
        assert_eq!(similarity("张三", "李四"), 0.0);
        assert!((similarity("张小三", "张三") - 0.8).abs() < 1e-9);
    }

    #[test]
    fn plain_names() {
        let m = matcher();
        assert_eq!(m.romanized_initials("张三"), "zs");
        assert_eq!(m.initial_list("李小明"), vec!["l", "x", "m"]);
    }

    #[test]
    fn single_character_surname() {
        let m = matcher();
        // Read "dan" by default, "shan" as a surname.
        assert_eq!(m.romanized_initials("单明"), "sm");
        assert_eq!(m.romanized_initials("曾明"), "zm");
    }

    #[test]
    fn compound_surname_wins_over_prefix() {
        let m = matcher();
        assert_eq!(m.romanized_initials("单于明"), "cym");
        assert_eq!(m.romanized_initials("尉迟恭"), "ycg");
    }

    #[test]
    fn characters_without_reading() {
        let m = matcher();
        assert_eq!(m.romanized_initials("A张"), "Az");
        assert_eq!(m.romanized_initials(""), "");
    }
}
