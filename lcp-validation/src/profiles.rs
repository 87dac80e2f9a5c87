//! Encryption profile policy and production-build detection material.

/// The open-source profile, accepted by every build.
pub const BASIC_PROFILE: &str = "http://readium.org/lcp/basic-profile";

/// The confidential production profile.
pub const PROFILE_1_0: &str = "http://readium.org/lcp/profile-1.0";

const PRODUCTION_PROFILES: &[&str] = &[BASIC_PROFILE, PROFILE_1_0];
const TEST_PROFILES: &[&str] = &[BASIC_PROFILE];

/// Profiles accepted by this kind of build.
#[must_use]
pub fn supported_profiles(production: bool) -> &'static [&'static str] {
    if production {
        PRODUCTION_PROFILES
    } else {
        TEST_PROFILES
    }
}

/// Probe license used to detect a production crypto build: only a
/// production build holds the key material to validate it.
pub(crate) const PROBE_LICENSE: &str = include_str!("../assets/prod-license.lcpl");

/// Known passphrase of the probe license.
pub(crate) const PROBE_PASSPHRASE: &str = "7B7602FEFL4RDDKDF";
