//! CPU capabilities relevant to codelet selection.

use std::sync::OnceLock;

/// Environment variable that forces the generic codelets when set to a truthy value.
pub const FORCE_GENERIC_ENV: &str = "FOURIER_FORCE_GENERIC";

/// The instruction set tier a codelet requires.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SimdLevel {
    /// Portable scalar code, always available.
    Generic,
    Sse2,
    Avx2,
    Avx512,
    Neon,
}

/// Detected (or requested) hardware capabilities.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Features {
    pub sse2: bool,
    pub avx2: bool,
    pub avx512: bool,
    pub neon: bool,
    /// Restrict selection to [`SimdLevel::Generic`] codelets.
    ///
    /// [`SimdLevel::Generic`]: enum.SimdLevel.html#variant.Generic
    pub force_generic: bool,
}

impl Features {
    /// Capabilities with no SIMD support.
    pub const fn generic() -> Self {
        Self {
            sse2: false,
            avx2: false,
            avx512: false,
            neon: false,
            force_generic: false,
        }
    }

    /// Detects the capabilities of the running CPU.
    ///
    /// The result is cached for the lifetime of the process, and honors
    /// [`FORCE_GENERIC_ENV`](constant.FORCE_GENERIC_ENV.html).
    pub fn detect() -> Self {
        static DETECTED: OnceLock<Features> = OnceLock::new();
        *DETECTED.get_or_init(|| {
            let mut features = probe();
            features.force_generic = std::env::var(FORCE_GENERIC_ENV)
                .map(|value| is_truthy(&value))
                .unwrap_or(false);
            tracing::debug!(?features, "detected CPU features");
            features
        })
    }

    /// Returns a copy with the force-generic override set.
    pub fn with_force_generic(mut self, force_generic: bool) -> Self {
        self.force_generic = force_generic;
        self
    }

    /// Returns true if codelets requiring `level` may run.
    pub fn supports(&self, level: SimdLevel) -> bool {
        match level {
            SimdLevel::Generic => true,
            _ if self.force_generic => false,
            SimdLevel::Sse2 => self.sse2,
            SimdLevel::Avx2 => self.avx2,
            SimdLevel::Avx512 => self.avx512,
            SimdLevel::Neon => self.neon,
        }
    }

    /// The widest tier these capabilities support.
    pub fn best_level(&self) -> SimdLevel {
        [
            SimdLevel::Avx512,
            SimdLevel::Avx2,
            SimdLevel::Neon,
            SimdLevel::Sse2,
        ]
        .iter()
        .copied()
        .find(|level| self.supports(*level))
        .unwrap_or(SimdLevel::Generic)
    }

    /// Compact encoding used to key wisdom: sse2 = 1, avx2 = 2, avx512 = 4, neon = 8.
    ///
    /// Forcing generic codelets encodes as 0, the same as a CPU without SIMD.
    pub fn fingerprint(&self) -> u64 {
        if self.force_generic {
            return 0;
        }
        let mut mask = 0;
        if self.sse2 {
            mask |= 1;
        }
        if self.avx2 {
            mask |= 2;
        }
        if self.avx512 {
            mask |= 4;
        }
        if self.neon {
            mask |= 8;
        }
        mask
    }
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false"))
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn probe() -> Features {
    Features {
        sse2: is_x86_feature_detected!("sse2"),
        avx2: is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma"),
        avx512: is_x86_feature_detected!("avx512f"),
        ..Features::generic()
    }
}

#[cfg(target_arch = "aarch64")]
fn probe() -> Features {
    Features {
        neon: std::arch::is_aarch64_feature_detected!("neon"),
        ..Features::generic()
    }
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
fn probe() -> Features {
    Features::generic()
}
