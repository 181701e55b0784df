//! Memory-domain copier.

use super::Transform;
use crate::caps::{CapsRef, FormatList};
use crate::format::FormatDescriptor;

/// 1-in/1-out transform that moves samples between memory domains
/// without touching their format.
///
/// Both streams are fixed to the format of the connection the copier is
/// inserted into.
pub struct SampleCopier {
    input: CapsRef,
    output: CapsRef,
    hardware_resident: bool,
}

impl SampleCopier {
    /// Name reported by every copier.
    pub const NAME: &'static str = "sample-copier";

    /// Create a copier for `format` that delivers into the given domain.
    pub fn new(format: FormatDescriptor, hardware_resident: bool) -> Self {
        Self {
            input: FormatList::fixed(format.clone()).into_ref(),
            output: FormatList::fixed(format).into_ref(),
            hardware_resident,
        }
    }
}

impl Transform for SampleCopier {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn input_caps(&self, index: usize) -> Option<CapsRef> {
        (index == 0).then(|| self.input.clone())
    }

    fn output_caps(&self, index: usize) -> Option<CapsRef> {
        (index == 0).then(|| self.output.clone())
    }

    fn hardware_resident(&self) -> bool {
        self.hardware_resident
    }
}

impl std::fmt::Debug for SampleCopier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleCopier")
            .field("format", &self.input.current())
            .field("hardware_resident", &self.hardware_resident)
            .finish()
    }
}
