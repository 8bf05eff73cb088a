use crate::config::*;
use dashmap::DashMap;
use log::{debug, warn};
use snafu::OptionExt;
use std::sync::Arc;

/// Resolved grade labels. Pre-seeded with the irregular labels, it grows as
/// new regular labels get read. An entry is never replaced once set.
#[derive(Debug, Default)]
pub struct SpecialGradeCache {
    entries: DashMap<String, GradeMask>,
}

impl SpecialGradeCache {
    pub fn new() -> SpecialGradeCache {
        SpecialGradeCache::default()
    }

    /// A cache holding the given irregular labels. The first mask given for a label wins.
    pub fn seeded<I>(labels: I) -> SpecialGradeCache
    where
        I: IntoIterator<Item = (String, GradeMask)>,
    {
        let cache = SpecialGradeCache::new();
        for (label, mask) in labels {
            cache.insert_if_absent(&label, mask);
        }
        cache
    }

    pub fn get(&self, label: &str) -> Option<GradeMask> {
        self.entries.get(label).map(|e| *e.value())
    }

    /// Stores the mask unless the label is already known, and returns the stored value.
    pub fn insert_if_absent(&self, label: &str, mask: GradeMask) -> GradeMask {
        *self.entries.entry(label.to_string()).or_insert(mask).value()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Turns free-text grade labels into grade masks.
pub struct GradeEncoder {
    initial: i32,
    elements: Vec<(String, i32)>,
    cache: Arc<SpecialGradeCache>,
}

impl GradeEncoder {
    pub fn new(tokens: GradeTokens, cache: Arc<SpecialGradeCache>) -> GradeEncoder {
        // An empty token would match forever.
        let elements: Vec<(String, i32)> = tokens
            .elements
            .into_iter()
            .filter(|(token, delta)| {
                if token.is_empty() {
                    warn!("GradeEncoder::new: dropping empty grade token (delta {})", delta);
                }
                !token.is_empty()
            })
            .collect();
        debug!(
            "GradeEncoder::new: {} tokens, {} labels in cache",
            elements.len(),
            cache.len()
        );
        GradeEncoder {
            initial: tokens.initial,
            elements,
            cache,
        }
    }

    /// Reads a grade label.
    ///
    /// Known labels come straight from the cache. Other labels are consumed
    /// token by token from the front; the first token of the grammar that
    /// matches is taken. The resulting single-bit mask is cached under `label`.
    pub fn encode(&self, label: &str) -> Result<GradeMask, GradeError> {
        if let Some(mask) = self.cache.get(label) {
            return Ok(mask);
        }

        let mut bit = self.initial;
        let mut rest = label;
        while !rest.is_empty() {
            let (token, delta) = self
                .elements
                .iter()
                .find(|(token, _)| rest.starts_with(token.as_str()))
                .context(UnknownGradeSnafu { label, rest })?;
            bit += delta;
            rest = &rest[token.len()..];
        }

        let mask = GradeMask::from_bit(bit).context(GradeOutOfRangeSnafu { label, bit })?;
        debug!("encode: {:?} -> bit {}", label, bit);
        Ok(self.cache.insert_if_absent(label, mask))
    }

    pub fn cache(&self) -> &SpecialGradeCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Levels relative to the first year of middle school, 初一 = 16.
    fn tokens() -> GradeTokens {
        GradeTokens {
            initial: 16,
            elements: vec![
                ("小".to_string(), -7),
                ("初".to_string(), -1),
                ("高".to_string(), 2),
                ("一".to_string(), 1),
                ("二".to_string(), 2),
                ("三".to_string(), 3),
                ("四".to_string(), 4),
                ("五".to_string(), 5),
                ("六".to_string(), 6),
                ("年级".to_string(), 0),
            ],
        }
    }

    fn encoder(cache: SpecialGradeCache) -> GradeEncoder {
        GradeEncoder::new(tokens(), Arc::new(cache))
    }

    #[test]
    fn regular_labels() {
        let enc = encoder(SpecialGradeCache::new());
        assert_eq!(enc.encode("初一"), Ok(GradeMask(1 << 16)));
        assert_eq!(enc.encode("初三"), Ok(GradeMask(1 << 18)));
        assert_eq!(enc.encode("高一"), Ok(GradeMask(1 << 19)));
        assert_eq!(enc.encode("高三"), Ok(GradeMask(1 << 21)));
        assert_eq!(enc.encode("小六"), Ok(GradeMask(1 << 15)));
        assert_eq!(enc.encode("小五年级"), Ok(GradeMask(1 << 14)));
    }

    #[test]
    fn composed_labels_are_single_bits() {
        let enc = encoder(SpecialGradeCache::new());
        for prefix in ["初", "高"] {
            for digit in ["一", "二", "三"] {
                let label = format!("{}{}", prefix, digit);
                let mask = enc.encode(&label).unwrap();
                assert_eq!(mask.0.count_ones(), 1, "{} -> {:?}", label, mask);
            }
        }
    }

    #[test]
    fn trailing_garbage_fails() {
        let enc = encoder(SpecialGradeCache::new());
        assert_eq!(
            enc.encode("初一班"),
            Err(GradeError::UnknownGrade {
                label: "初一班".to_string(),
                rest: "班".to_string()
            })
        );
        assert!(matches!(
            enc.encode("大学"),
            Err(GradeError::UnknownGrade { .. })
        ));
        assert!(enc.cache().get("初一班").is_none());
    }

    #[test]
    fn out_of_range_fails() {
        let enc = encoder(SpecialGradeCache::new());
        // 16 + 6 * 3 = 34
        assert_eq!(
            enc.encode("六六六"),
            Err(GradeError::GradeOutOfRange {
                label: "六六六".to_string(),
                bit: 34
            })
        );
    }

    #[test]
    fn special_labels_come_from_cache() {
        let cache = SpecialGradeCache::seeded(vec![
            ("小学/无".to_string(), GradeMask::PRIMARY_OR_NONE),
            ("初一".to_string(), GradeMask(1 << 3)),
        ]);
        let enc = encoder(cache);
        assert_eq!(enc.encode("小学/无"), Ok(GradeMask::PRIMARY_OR_NONE));
        // The seeded value shadows the grammar.
        assert_eq!(enc.encode("初一"), Ok(GradeMask(1 << 3)));
    }

    #[test]
    fn resolved_labels_are_memoized() {
        let enc = encoder(SpecialGradeCache::new());
        assert!(enc.cache().is_empty());
        let first = enc.encode("高二").unwrap();
        assert_eq!(enc.cache().get("高二"), Some(first));
        assert_eq!(enc.encode("高二"), Ok(first));
        assert_eq!(enc.cache().len(), 1);
    }

    #[test]
    fn cache_never_overwrites() {
        let cache = SpecialGradeCache::new();
        assert_eq!(cache.insert_if_absent("x", GradeMask(1)), GradeMask(1));
        assert_eq!(cache.insert_if_absent("x", GradeMask(2)), GradeMask(1));
        assert_eq!(cache.get("x"), Some(GradeMask(1)));
    }

    #[test]
    fn empty_tokens_are_dropped() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut grammar = tokens();
        grammar.elements.insert(0, (String::new(), 5));
        let enc = GradeEncoder::new(grammar, Arc::new(SpecialGradeCache::new()));
        assert_eq!(enc.encode("初一"), Ok(GradeMask(1 << 16)));
        assert!(matches!(
            enc.encode("初一班"),
            Err(GradeError::UnknownGrade { .. })
        ));
    }

    #[test]
    fn empty_label_is_the_initial_grade() {
        let enc = encoder(SpecialGradeCache::new());
        assert_eq!(enc.encode(""), Ok(GradeMask(1 << 16)));
    }

    #[test]
    fn concurrent_encoding_agrees() {
        let enc = Arc::new(encoder(SpecialGradeCache::new()));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let enc = enc.clone();
                std::thread::spawn(move || enc.encode("初二").unwrap())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), GradeMask(1 << 17));
        }
        assert_eq!(enc.cache().len(), 1);
    }
}
