//! Memory images
//!
//! Test vectors arrive as text files with one 32-bit hex word per line.
//! A single-layer image places four sections back to back, each padded
//! with zero words to a 16-word block:
//!
//! ```text
//! ┌─────────┬──────────┬────────┬─────────┐
//! │ IFM     │ FILTER   │ BIAS   │ SCALE   │
//! │ pad 16  │ pad 16   │ pad 16 │ pad 16  │
//! └─────────┴──────────┴────────┴─────────┘
//! ```
//!
//! Offsets are in 32-bit words; multiply by four for a STORE_RAM address.
//!
//! For a convolution layer the raw inputs are first checked against the
//! layer shape with [`LayerParams::verify_inputs`], the filter is packed
//! with [`pack_filter_32b`], and [`ImageLayout::for_layer`] gives the
//! offsets.

use aix_protocol::WORD_LEN;

/// Section alignment in words
pub const BLOCK_WORDS: usize = 16;

/// Errors while reading or building an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImageError {
    /// Line is not a hex number that fits in 32 bits (1-based line number)
    InvalidHex { line: usize },
    /// Input and output channel counts must both be multiples of 4
    ChannelsNotMultipleOf4 { cin: usize, cout: usize },
    /// A section has fewer lines than the layer needs
    SectionTooShort {
        section: Section,
        have: usize,
        need: usize,
    },
    /// Output buffer cannot hold the packed words
    BufferTooSmall { need: usize },
}

/// Iterator over the words of a hex text file
///
/// Blank lines are skipped. A `0x` prefix is accepted.
pub struct HexWords<'a> {
    lines: core::str::Lines<'a>,
    line: usize,
}

impl<'a> HexWords<'a> {
    /// Iterate over the words in `text`
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            line: 0,
        }
    }
}

impl Iterator for HexWords<'_> {
    type Item = Result<u32, ImageError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let raw = self.lines.next()?;
            self.line += 1;

            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            let digits = trimmed
                .strip_prefix("0x")
                .or_else(|| trimmed.strip_prefix("0X"))
                .unwrap_or(trimmed);

            return Some(
                u32::from_str_radix(digits, 16)
                    .map_err(|_| ImageError::InvalidHex { line: self.line }),
            );
        }
    }
}

/// Round a word count up to a whole number of blocks
pub fn pad_to_block(words: usize) -> usize {
    words.div_ceil(BLOCK_WORDS) * BLOCK_WORDS
}

/// Split a word into its 16-bit halves, low half first
pub fn split_halves(word: u32) -> [u16; 2] {
    [word as u16, (word >> 16) as u16]
}

/// Image sections in layout order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Section {
    /// Input feature map
    Ifm,
    /// Convolution filter weights
    Filter,
    /// Per-channel bias
    Bias,
    /// Per-channel scale
    Scale,
}

impl Section {
    /// All sections in layout order
    pub const ALL: [Section; 4] = [Section::Ifm, Section::Filter, Section::Bias, Section::Scale];
}

/// Kernel taps per filter (3x3)
pub const KERNEL_TAPS: usize = 9;

/// Shape of one convolution layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayerParams {
    pub width: usize,
    pub height: usize,
    /// Input channels
    pub cin: usize,
    /// Output channels
    pub cout: usize,
}

impl LayerParams {
    /// Reject channel counts the engine cannot pack
    pub fn check(&self) -> Result<(), ImageError> {
        if self.cin % 4 != 0 || self.cout % 4 != 0 {
            return Err(ImageError::ChannelsNotMultipleOf4 {
                cin: self.cin,
                cout: self.cout,
            });
        }
        Ok(())
    }

    /// IFM words: four input channels share a word
    pub fn ifm_words(&self) -> usize {
        self.width * self.height * (self.cin / 4)
    }

    /// Filter lines before packing, one weight per line
    pub fn filter_lines(&self) -> usize {
        self.cout * self.cin * KERNEL_TAPS
    }

    /// Filter words after [`pack_filter_32b`]
    pub fn filter_words(&self) -> usize {
        self.filter_lines() / 4
    }

    /// Bias words, and likewise scale words
    pub fn affine_words(&self) -> usize {
        self.cout
    }

    /// Check the raw section inputs and cut each to the length the layer uses
    ///
    /// `filter` holds unpacked lines, one weight per line.
    pub fn verify_inputs<'a>(
        &self,
        ifm: &'a [u32],
        filter: &'a [u32],
        bias: &'a [u32],
        scale: &'a [u32],
    ) -> Result<[&'a [u32]; 4], ImageError> {
        self.check()?;
        let need = [
            self.ifm_words(),
            self.filter_lines(),
            self.affine_words(),
            self.affine_words(),
        ];
        let mut inputs = [ifm, filter, bias, scale];
        for (i, &section) in Section::ALL.iter().enumerate() {
            let input: &'a [u32] = inputs[i];
            if input.len() < need[i] {
                return Err(ImageError::SectionTooShort {
                    section,
                    have: input.len(),
                    need: need[i],
                });
            }
            inputs[i] = &input[..need[i]];
        }
        Ok(inputs)
    }
}

/// Pack filter weights four output channels to a word
///
/// Only the low byte of each line is a weight. For every group of four
/// output channels, and every input channel and tap, the weights of the
/// four channels fill one word with the lowest channel in the low byte.
/// Returns the number of words written to `out`.
pub fn pack_filter_32b(
    params: &LayerParams,
    filter: &[u32],
    out: &mut [u32],
) -> Result<usize, ImageError> {
    params.check()?;
    let need = params.filter_lines();
    if filter.len() < need {
        return Err(ImageError::SectionTooShort {
            section: Section::Filter,
            have: filter.len(),
            need,
        });
    }
    let words = params.filter_words();
    if out.len() < words {
        return Err(ImageError::BufferTooSmall { need: words });
    }

    let mut n = 0;
    for group in (0..params.cout).step_by(4) {
        for ci in 0..params.cin {
            for tap in 0..KERNEL_TAPS {
                let mut word = 0u32;
                for lane in 0..4 {
                    let co = group + lane;
                    let index = (co * params.cin + ci) * KERNEL_TAPS + tap;
                    word |= (filter[index] & 0xFF) << (8 * lane);
                }
                out[n] = word;
                n += 1;
            }
        }
    }
    Ok(n)
}

/// Lay out the affine block: every bias, then every scale
///
/// Returns the number of words written to `out`.
pub fn pack_affine(
    params: &LayerParams,
    bias: &[u32],
    scale: &[u32],
    out: &mut [u32],
) -> Result<usize, ImageError> {
    let cout = params.affine_words();
    for (section, have) in [(Section::Bias, bias.len()), (Section::Scale, scale.len())] {
        if have < cout {
            return Err(ImageError::SectionTooShort {
                section,
                have,
                need: cout,
            });
        }
    }
    if out.len() < 2 * cout {
        return Err(ImageError::BufferTooSmall { need: 2 * cout });
    }
    out[..cout].copy_from_slice(&bias[..cout]);
    out[cout..2 * cout].copy_from_slice(&scale[..cout]);
    Ok(2 * cout)
}

/// Word offsets of a single-layer memory image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImageLayout {
    lengths: [usize; 4],
    offsets: [usize; 4],
    total_words: usize,
}

impl ImageLayout {
    /// Lay out IFM, filter, bias and scale sections of the given word counts
    pub fn monolayer(ifm: usize, filter: usize, bias: usize, scale: usize) -> Self {
        let lengths = [ifm, filter, bias, scale];
        let mut offsets = [0usize; 4];
        let mut next = 0;
        for (offset, &len) in offsets.iter_mut().zip(lengths.iter()) {
            *offset = next;
            next += pad_to_block(len);
        }
        Self {
            lengths,
            offsets,
            total_words: next,
        }
    }

    /// Lay out the packed sections of one convolution layer
    pub fn for_layer(params: &LayerParams) -> Result<Self, ImageError> {
        params.check()?;
        Ok(Self::monolayer(
            params.ifm_words(),
            params.filter_words(),
            params.affine_words(),
            params.affine_words(),
        ))
    }

    /// Word offset of `section`
    pub fn offset(&self, section: Section) -> usize {
        self.offsets[section as usize]
    }

    /// Unpadded word count of `section`
    pub fn section_len(&self, section: Section) -> usize {
        self.lengths[section as usize]
    }

    /// Byte offset of `section`, as used in a STORE_RAM descriptor
    pub fn byte_address(&self, section: Section) -> usize {
        self.offset(section) * WORD_LEN
    }

    /// Total image size in words, padding included
    pub fn total_words(&self) -> usize {
        self.total_words
    }

    /// Whether the image holds no words at all
    pub fn is_empty(&self) -> bool {
        self.total_words == 0
    }

    /// Stream the padded image built from the four section contents
    ///
    /// Each slice is truncated to the length it was laid out with and
    /// padded with zeros if shorter.
    pub fn words<'a>(&self, sections: [&'a [u32]; 4]) -> ImageWords<'a> {
        ImageWords {
            layout: *self,
            sections,
            position: 0,
        }
    }
}

/// Padded words of an image, see [`ImageLayout::words`]
pub struct ImageWords<'a> {
    layout: ImageLayout,
    sections: [&'a [u32]; 4],
    position: usize,
}

impl Iterator for ImageWords<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.position >= self.layout.total_words {
            return None;
        }
        let pos = self.position;
        self.position += 1;

        let index = Section::ALL
            .iter()
            .rposition(|&s| self.layout.offset(s) <= pos)
            .unwrap_or(0);
        let section = Section::ALL[index];
        let within = pos - self.layout.offset(section);

        if within < self.layout.section_len(section) {
            Some(self.sections[index].get(within).copied().unwrap_or(0))
        } else {
            Some(0)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.layout.total_words - self.position;
        (left, Some(left))
    }
}

impl ExactSizeIterator for ImageWords<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::vec::Vec;

    #[test]
    fn test_hex_words_skips_blank_lines() {
        let text = "0000abcd\n\n  FFFFFFFF  \n0x10\n";
        let words: Result<Vec<u32>, _> = HexWords::new(text).collect();
        assert_eq!(words, Ok(vec![0xABCD, 0xFFFF_FFFF, 0x10]));
    }

    #[test]
    fn test_hex_words_reports_line() {
        let text = "00000001\n\nnot-hex\n";
        let words: Vec<_> = HexWords::new(text).collect();
        assert_eq!(words, [Ok(1), Err(ImageError::InvalidHex { line: 3 })]);
    }

    #[test]
    fn test_hex_word_too_wide() {
        let mut words = HexWords::new("100000000");
        assert_eq!(words.next(), Some(Err(ImageError::InvalidHex { line: 1 })));
        assert_eq!(words.next(), None);
    }

    #[test]
    fn test_pad_to_block() {
        assert_eq!(pad_to_block(0), 0);
        assert_eq!(pad_to_block(1), 16);
        assert_eq!(pad_to_block(16), 16);
        assert_eq!(pad_to_block(17), 32);
    }

    #[test]
    fn test_split_halves_low_first() {
        assert_eq!(split_halves(0x1122_3344), [0x3344, 0x1122]);
    }

    #[test]
    fn test_monolayer_offsets() {
        let layout = ImageLayout::monolayer(20, 16, 3, 3);
        assert_eq!(layout.offset(Section::Ifm), 0);
        assert_eq!(layout.offset(Section::Filter), 32);
        assert_eq!(layout.offset(Section::Bias), 48);
        assert_eq!(layout.offset(Section::Scale), 64);
        assert_eq!(layout.total_words(), 80);
        assert_eq!(layout.byte_address(Section::Bias), 192);
    }

    #[test]
    fn test_image_words_pads_sections() {
        let layout = ImageLayout::monolayer(2, 1, 1, 1);
        let words: Vec<u32> = layout.words([&[1, 2], &[3], &[4], &[5]]).collect();

        assert_eq!(words.len(), 64);
        assert_eq!(layout.words([&[], &[], &[], &[]]).len(), 64);
        assert_eq!(&words[..3], &[1, 2, 0]);
        assert_eq!(words[16], 3);
        assert_eq!(words[32], 4);
        assert_eq!(words[48], 5);
        assert_eq!(words.iter().filter(|&&w| w != 0).count(), 5);
    }

    #[test]
    fn test_image_words_skips_empty_sections() {
        let layout = ImageLayout::monolayer(1, 0, 0, 1);
        let words: Vec<u32> = layout.words([&[7], &[], &[], &[9]]).collect();
        assert_eq!(words.len(), 32);
        assert_eq!(words[0], 7);
        assert_eq!(words[16], 9);
    }

    const LAYER: LayerParams = LayerParams {
        width: 2,
        height: 2,
        cin: 4,
        cout: 4,
    };

    #[test]
    fn test_layer_section_counts() {
        assert_eq!(LAYER.ifm_words(), 4);
        assert_eq!(LAYER.filter_lines(), 144);
        assert_eq!(LAYER.filter_words(), 36);
        assert_eq!(LAYER.affine_words(), 4);
    }

    #[test]
    fn test_channels_must_be_multiples_of_four() {
        let params = LayerParams { cin: 6, ..LAYER };
        assert_eq!(
            params.check(),
            Err(ImageError::ChannelsNotMultipleOf4 { cin: 6, cout: 4 })
        );
        assert_eq!(
            ImageLayout::for_layer(&LayerParams { cout: 2, ..LAYER }),
            Err(ImageError::ChannelsNotMultipleOf4 { cin: 4, cout: 2 })
        );
    }

    #[test]
    fn test_verify_inputs_rejects_short_filter() {
        let ifm = [0u32; 4];
        let affine = [0u32; 4];
        let result = LAYER.verify_inputs(&ifm, &[1], &affine, &affine);
        assert_eq!(
            result,
            Err(ImageError::SectionTooShort {
                section: Section::Filter,
                have: 1,
                need: 144,
            })
        );
    }

    #[test]
    fn test_verify_inputs_truncates_long_sections() {
        let ifm = [1u32; 10];
        let filter = [2u32; 150];
        let bias = [3u32; 4];
        let scale = [4u32; 5];
        let [ifm, filter, bias, scale] = LAYER
            .verify_inputs(&ifm, &filter, &bias, &scale)
            .unwrap();
        assert_eq!(ifm.len(), 4);
        assert_eq!(filter.len(), 144);
        assert_eq!(bias.len(), 4);
        assert_eq!(scale.len(), 4);
    }

    #[test]
    fn test_pack_filter_groups_four_output_channels() {
        let params = LayerParams { cout: 8, ..LAYER };
        // High bits are not weights and must be masked off
        let filter: Vec<u32> = (0..params.filter_lines() as u32)
            .map(|i| 0xABCD_0000 | (i & 0xFF))
            .collect();
        let mut packed = vec![0u32; params.filter_words()];

        assert_eq!(pack_filter_32b(&params, &filter, &mut packed), Ok(72));
        // cout 0..4, cin 0, tap 0: lines 0, 36, 72, 108
        assert_eq!(packed[0], 0x6C48_2400);
        // tap 1: lines 1, 37, 73, 109
        assert_eq!(packed[1], 0x6D49_2501);
        // cin 1, tap 0: lines 9, 45, 81, 117
        assert_eq!(packed[9], 0x7551_2D09);
        // cout 4..8, cin 0, tap 0: lines 144, 180, 216, 252
        assert_eq!(packed[36], 0xFCD8_B490);
    }

    #[test]
    fn test_pack_filter_checks_lengths() {
        let filter = [0u32; 144];
        let mut small = [0u32; 35];
        assert_eq!(
            pack_filter_32b(&LAYER, &filter, &mut small),
            Err(ImageError::BufferTooSmall { need: 36 })
        );
        let mut out = [0u32; 36];
        assert_eq!(
            pack_filter_32b(&LAYER, &filter[..143], &mut out),
            Err(ImageError::SectionTooShort {
                section: Section::Filter,
                have: 143,
                need: 144,
            })
        );
    }

    #[test]
    fn test_pack_affine_biases_then_scales() {
        let mut out = [0u32; 8];
        let written = pack_affine(&LAYER, &[1, 2, 3, 4, 99], &[5, 6, 7, 8], &mut out);
        assert_eq!(written, Ok(8));
        assert_eq!(out, [1, 2, 3, 4, 5, 6, 7, 8]);

        assert_eq!(
            pack_affine(&LAYER, &[1, 2, 3, 4], &[5, 6], &mut out),
            Err(ImageError::SectionTooShort {
                section: Section::Scale,
                have: 2,
                need: 4,
            })
        );
    }

    #[test]
    fn test_for_layer_offsets() {
        let layout = ImageLayout::for_layer(&LAYER).unwrap();
        assert_eq!(layout.section_len(Section::Filter), 36);
        assert_eq!(layout.offset(Section::Filter), 16);
        assert_eq!(layout.offset(Section::Bias), 64);
        assert_eq!(layout.offset(Section::Scale), 80);
        assert_eq!(layout.total_words(), 96);
    }

    proptest! {
        #[test]
        fn test_image_sections_land_at_their_offsets(
            sections in prop::array::uniform4(prop::collection::vec(any::<u32>(), 0..40))
        ) {
            let layout = ImageLayout::monolayer(
                sections[0].len(),
                sections[1].len(),
                sections[2].len(),
                sections[3].len(),
            );
            let words: Vec<u32> = layout
                .words([
                    sections[0].as_slice(),
                    sections[1].as_slice(),
                    sections[2].as_slice(),
                    sections[3].as_slice(),
                ])
                .collect();

            prop_assert_eq!(words.len(), layout.total_words());
            prop_assert_eq!(words.len() % BLOCK_WORDS, 0);
            for (section, contents) in Section::ALL.iter().zip(sections.iter()) {
                let start = layout.offset(*section);
                prop_assert_eq!(start % BLOCK_WORDS, 0);
                prop_assert_eq!(&words[start..start + contents.len()], contents.as_slice());
            }
        }
    }
}
