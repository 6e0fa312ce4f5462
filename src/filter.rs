//! Bitmap filter over registry indices: set bit means "skip this descriptor".

use crate::flags::{FilterMode, UsageClass};
use crate::registry::REGISTRY;

#[derive(Clone)]
pub struct Filter {
    /// One entry per registry descriptor; `true` means "skip".
    skip: Vec<bool>,
}

impl Filter {
    fn new_all_clear() -> Self {
        Filter { skip: vec![false; REGISTRY.len()] }
    }

    pub fn skips(&self, index: usize) -> bool {
        self.skip.get(index).copied().unwrap_or(false)
    }

    /// Clear all bits, keeping the bitmap allocated.
    pub fn reset(&mut self) {
        self.skip.iter_mut().for_each(|b| *b = false);
    }

    pub fn invert(&mut self) {
        self.skip.iter_mut().for_each(|b| *b = !*b);
    }

    /// Build a filter restricting iteration to (`OnlyIn`) or excluding
    /// (`NotIn`) the named descriptors.
    pub fn by_names(mode: FilterMode, names: &[&str]) -> Self {
        let mut f = Self::new_all_clear();
        for (i, d) in REGISTRY.iter().enumerate() {
            let in_list = names.contains(&d.name);
            f.skip[i] = match mode {
                FilterMode::OnlyIn => !in_list,
                FilterMode::NotIn => in_list,
            };
        }
        f
    }

    /// Build a filter restricting iteration to (`OnlyIn`) or excluding
    /// (`NotIn`) descriptors whose usage intersects `mask`.
    pub fn by_usage(mode: FilterMode, mask: UsageClass) -> Self {
        let mut f = Self::new_all_clear();
        for (i, d) in REGISTRY.iter().enumerate() {
            let matches = d.usage.intersects(mask);
            f.skip[i] = match mode {
                FilterMode::OnlyIn => !matches,
                FilterMode::NotIn => matches,
            };
        }
        f
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn onlyin_keeps_named_descriptors() {
        let f = Filter::by_names(FilterMode::OnlyIn, &["ext4"]);
        let ext4_idx = REGISTRY.iter().position(|d| d.name == "ext4").unwrap();
        let xfs_idx = REGISTRY.iter().position(|d| d.name == "xfs").unwrap();
        assert!(!f.skips(ext4_idx));
        assert!(f.skips(xfs_idx));
    }

    #[test]
    fn notin_excludes_named_descriptors() {
        let f = Filter::by_names(FilterMode::NotIn, &["ext4"]);
        let ext4_idx = REGISTRY.iter().position(|d| d.name == "ext4").unwrap();
        let xfs_idx = REGISTRY.iter().position(|d| d.name == "xfs").unwrap();
        assert!(f.skips(ext4_idx));
        assert!(!f.skips(xfs_idx));
    }

    #[test]
    fn invert_is_symmetric_with_onlyin_notin() {
        let mut onlyin = Filter::by_names(FilterMode::OnlyIn, &["ext4"]);
        onlyin.invert();
        let notin = Filter::by_names(FilterMode::NotIn, &["ext4"]);
        assert_eq!(onlyin.skip, notin.skip);
    }

    #[test]
    fn usage_mask_filters_by_class() {
        let f = Filter::by_usage(FilterMode::OnlyIn, UsageClass::RAID | UsageClass::CRYPTO);
        let raid_idx = REGISTRY.iter().position(|d| d.name == "linux_raid_member").unwrap();
        let ext4_idx = REGISTRY.iter().position(|d| d.name == "ext4").unwrap();
        assert!(!f.skips(raid_idx));
        assert!(f.skips(ext4_idx));
    }

    #[test]
    fn reset_clears_all_bits() {
        let mut f = Filter::by_names(FilterMode::NotIn, &["ext4"]);
        f.reset();
        assert!(f.skip.iter().all(|&s| !s));
    }
}
