//! Composite State Assembler
//!
//! Lays per-modality phase buffers out at fixed offsets of one flat vector
//! that matches the engine's node indexing.

use crate::codec::{text, waveform, Modality};
use anyhow::{bail, ensure, Context, Result};
use serde::Serialize;
use std::ops::Range;

/// Contiguous slice of the composite vector owned by one modality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    pub modality: Modality,
    pub start: usize,
    pub len: usize,
}

impl Region {
    pub fn new(modality: Modality, start: usize, len: usize) -> Self {
        Self {
            modality,
            start,
            len,
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

/// Fixed region map for one deployment.
///
/// Regions never overlap, never leave the vector, and never move after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateLayout {
    total_len: usize,
    regions: Vec<Region>,
}

impl StateLayout {
    pub fn new(total_len: usize, mut regions: Vec<Region>) -> Result<Self> {
        regions.sort_by_key(|r| r.start);

        for (i, region) in regions.iter().enumerate() {
            let end = region.start.checked_add(region.len);
            ensure!(
                end.is_some_and(|end| end <= total_len),
                "Region {} (start {}, len {}) exceeds vector length {}",
                region.modality,
                region.start,
                region.len,
                total_len
            );
            if regions[..i].iter().any(|r| r.modality == region.modality) {
                bail!("Modality {} declared twice", region.modality);
            }
            if let Some(prev) = i.checked_sub(1).map(|p| &regions[p]) {
                ensure!(
                    prev.end() <= region.start,
                    "Region {} ({:?}) overlaps {} ({:?})",
                    region.modality,
                    region.range(),
                    prev.modality,
                    prev.range()
                );
            }
        }

        Ok(Self { total_len, regions })
    }

    /// Pack regions back to back in the given order; zero-length entries are skipped
    pub fn contiguous(sizes: &[(Modality, usize)]) -> Result<Self> {
        let mut start = 0;
        let mut regions = Vec::with_capacity(sizes.len());
        for &(modality, len) in sizes {
            if len == 0 {
                continue;
            }
            regions.push(Region::new(modality, start, len));
            start = start
                .checked_add(len)
                .with_context(|| format!("Layout overflows at the {} region", modality))?;
        }
        Self::new(start, regions)
    }

    pub fn total_len(&self) -> usize {
        self.total_len
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region(&self, modality: Modality) -> Option<Region> {
        self.regions.iter().copied().find(|r| r.modality == modality)
    }

    /// Build a full vector from per-modality parts. Uncovered nodes stay at phase 0.
    pub fn assemble(&self, parts: &[(Modality, &[f64])]) -> Result<Vec<f64>> {
        let mut full = vec![0.0; self.total_len];
        for &(modality, phases) in parts {
            let Some(region) = self.region(modality) else {
                bail!("Layout has no {} region", modality);
            };
            ensure!(
                phases.len() == region.len,
                "{} vector has {} phases, region holds {}",
                modality,
                phases.len(),
                region.len
            );
            full[region.range()].copy_from_slice(phases);
        }
        Ok(full)
    }

    /// Read-only view of one modality's slice of a full vector
    pub fn disassemble<'a>(&self, full: &'a [f64], modality: Modality) -> Result<&'a [f64]> {
        ensure!(
            full.len() == self.total_len,
            "Full vector has {} phases, layout expects {}",
            full.len(),
            self.total_len
        );
        match self.region(modality) {
            Some(region) => Ok(&full[region.range()]),
            None => bail!("Layout has no {} region", modality),
        }
    }

    /// Image cue plus text and synthetic waveform in their own regions.
    ///
    /// Any channel missing from the layout is left out.
    pub fn compose_cue(&self, image: &[f64], caption: &str) -> Result<Vec<f64>> {
        let mut owned: Vec<(Modality, Vec<f64>)> = Vec::new();
        if let Some(region) = self.region(Modality::Text) {
            owned.push((Modality::Text, text::encode_str(caption, region.len)));
        }
        if let Some(region) = self.region(Modality::Waveform) {
            owned.push((Modality::Waveform, waveform::synthesize(region.len)));
        }

        let mut parts: Vec<(Modality, &[f64])> = vec![(Modality::Image, image)];
        parts.extend(owned.iter().map(|(m, v)| (*m, v.as_slice())));
        self.assemble(&parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::text::decode_str;

    fn layout() -> StateLayout {
        StateLayout::contiguous(&[
            (Modality::Image, 16),
            (Modality::Text, 4),
            (Modality::Waveform, 8),
        ])
        .unwrap()
    }

    #[test]
    fn test_contiguous_offsets() {
        let layout = layout();
        assert_eq!(layout.total_len(), 28);
        assert_eq!(layout.region(Modality::Image), Some(Region::new(Modality::Image, 0, 16)));
        assert_eq!(layout.region(Modality::Text), Some(Region::new(Modality::Text, 16, 4)));
        assert_eq!(
            layout.region(Modality::Waveform),
            Some(Region::new(Modality::Waveform, 20, 8))
        );
    }

    #[test]
    fn test_zero_length_regions_are_skipped() {
        let layout = StateLayout::contiguous(&[(Modality::Image, 9), (Modality::Text, 0)]).unwrap();
        assert_eq!(layout.total_len(), 9);
        assert!(layout.region(Modality::Text).is_none());
    }

    #[test]
    fn test_overlap_and_bounds_rejected() {
        let overlapping = StateLayout::new(
            10,
            vec![
                Region::new(Modality::Image, 0, 6),
                Region::new(Modality::Text, 5, 3),
            ],
        );
        assert!(overlapping.is_err());

        let out_of_bounds = StateLayout::new(4, vec![Region::new(Modality::Image, 2, 3)]);
        assert!(out_of_bounds.is_err());

        let duplicate = StateLayout::new(
            10,
            vec![
                Region::new(Modality::Image, 0, 2),
                Region::new(Modality::Image, 4, 2),
            ],
        );
        assert!(duplicate.is_err());
    }

    #[test]
    fn test_overflowing_regions_rejected() {
        let huge = Region::new(Modality::Image, usize::MAX, 2);
        assert!(StateLayout::new(usize::MAX, vec![huge]).is_err());

        let sizes = [(Modality::Image, usize::MAX), (Modality::Text, 2)];
        assert!(StateLayout::contiguous(&sizes).is_err());
    }

    #[test]
    fn test_partial_assembly_defaults_to_zero() {
        let layout = layout();
        let text = [1.0, 2.0, 3.0, 4.0];
        let full = layout.assemble(&[(Modality::Text, &text)]).unwrap();

        assert_eq!(full.len(), 28);
        assert!(full[..16].iter().all(|&p| p == 0.0));
        assert_eq!(&full[16..20], &text);
        assert!(full[20..].iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let layout = layout();
        assert!(layout.assemble(&[(Modality::Text, &[1.0, 2.0])]).is_err());

        let image_only = StateLayout::contiguous(&[(Modality::Image, 4)]).unwrap();
        assert!(image_only.assemble(&[(Modality::Text, &[0.5; 4])]).is_err());
    }

    #[test]
    fn test_disassemble_returns_region_view() {
        let layout = layout();
        let image: Vec<f64> = (0..16).map(|i| i as f64 * 0.1).collect();
        let wave = [0.5; 8];
        let full = layout
            .assemble(&[(Modality::Image, &image), (Modality::Waveform, &wave)])
            .unwrap();

        assert_eq!(layout.disassemble(&full, Modality::Image).unwrap(), image.as_slice());
        assert_eq!(layout.disassemble(&full, Modality::Waveform).unwrap(), &wave);
        assert!(layout.disassemble(&full[..10], Modality::Image).is_err());
    }

    #[test]
    fn test_compose_cue_fills_every_channel() {
        let layout = layout();
        let image = [std::f64::consts::PI; 16];
        let cue = layout.compose_cue(&image, "HI").unwrap();

        let text = layout.disassemble(&cue, Modality::Text).unwrap();
        assert_eq!(decode_str(text), "HI··");
        let wave = layout.disassemble(&cue, Modality::Waveform).unwrap();
        assert_eq!(wave, waveform::synthesize(8).as_slice());
    }
}
