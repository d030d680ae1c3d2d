//! Verification purposes and their mapping to trusted-list service types.
//!
//! A caller validates a certificate chain for a declared purpose, such as
//! verifying a PID or checking the revocation status of an attestation.
//! Each purpose is served by exactly one list profile, and within that
//! profile by one of two service type identifiers: the issuance service or
//! the revocation service.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::common_models::macros::{impl_display, impl_from, impl_into};

/// Opaque URI distinguishing, within one list profile, the issuance
/// service from the revocation service.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct ServiceTypeId(String);
impl_display!(ServiceTypeId);
impl_from!(ServiceTypeId; String);
impl_into!(ServiceTypeId; String);

impl ServiceTypeId {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for ServiceTypeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The reason a caller wants a certificate chain validated.
///
/// The set is closed apart from the use-case-scoped `Eaa`/`EaaStatus` pair
/// and the `Custom` escape hatch, which is never mapped to a list profile
/// and must be wired to an anchor source explicitly.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Display)]
pub enum VerificationContext {
    WalletInstanceAttestation,
    WalletUnitAttestation,
    WalletUnitAttestationStatus,
    #[strum(serialize = "PID")]
    Pid,
    #[strum(serialize = "PIDStatus")]
    PidStatus,
    #[strum(serialize = "PubEAA")]
    PubEaa,
    #[strum(serialize = "PubEAAStatus")]
    PubEaaStatus,
    #[strum(serialize = "QEAA")]
    Qeaa,
    #[strum(serialize = "QEAAStatus")]
    QeaaStatus,
    WalletRelyingPartyRegistrationCertificate,
    WalletRelyingPartyAccessCertificate,
    #[strum(serialize = "EAA")]
    Eaa { use_case: String },
    #[strum(serialize = "EAAStatus")]
    EaaStatus { use_case: String },
    Custom { use_case: String },
}

/// Whether a purpose is anchored in a profile's issuance service or its
/// revocation service.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Display)]
pub enum ServiceFlavor {
    Issuance,
    Revocation,
}

impl VerificationContext {
    /// Status purposes select the revocation service, everything else the
    /// issuance service.
    pub fn flavor(&self) -> ServiceFlavor {
        match self {
            Self::WalletUnitAttestationStatus
            | Self::PidStatus
            | Self::PubEaaStatus
            | Self::QeaaStatus
            | Self::EaaStatus { .. } => ServiceFlavor::Revocation,
            _ => ServiceFlavor::Issuance,
        }
    }

    /// The list profile whose trusted list supplies anchors for this
    /// purpose. `Custom` purposes have no profile.
    pub fn profile(&self) -> Option<ListProfile> {
        match self {
            Self::WalletInstanceAttestation
            | Self::WalletUnitAttestation
            | Self::WalletUnitAttestationStatus => Some(ListProfile::WalletProviders),
            Self::Pid | Self::PidStatus => Some(ListProfile::PidProviders),
            Self::PubEaa | Self::PubEaaStatus => Some(ListProfile::PubEaaProviders),
            Self::Qeaa | Self::QeaaStatus => Some(ListProfile::QeaaProviders),
            Self::Eaa { use_case } | Self::EaaStatus { use_case } => {
                Some(ListProfile::EaaProviders {
                    use_case: use_case.clone(),
                })
            }
            Self::WalletRelyingPartyRegistrationCertificate => {
                Some(ListProfile::RelyingPartyRegistrars)
            }
            Self::WalletRelyingPartyAccessCertificate => Some(ListProfile::RelyingPartyAccessCas),
            Self::Custom { .. } => None,
        }
    }

    /// The service type identifier advertised for this purpose within its
    /// profile's trusted list. `None` for `Custom` purposes.
    pub fn service_type(&self) -> Option<ServiceTypeId> {
        let pair = self.profile()?.service_types();
        Some(match self.flavor() {
            ServiceFlavor::Issuance => pair.issuance,
            ServiceFlavor::Revocation => pair.revocation,
        })
    }

    /// The revocation-flavored purpose paired with this one, if any.
    pub fn status_counterpart(&self) -> Option<VerificationContext> {
        match self {
            Self::WalletUnitAttestation => Some(Self::WalletUnitAttestationStatus),
            Self::Pid => Some(Self::PidStatus),
            Self::PubEaa => Some(Self::PubEaaStatus),
            Self::Qeaa => Some(Self::QeaaStatus),
            Self::Eaa { use_case } => Some(Self::EaaStatus {
                use_case: use_case.clone(),
            }),
            _ => None,
        }
    }
}

/// A trusted-list profile: the kind of providers one list enumerates.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum ListProfile {
    WalletProviders,
    PidProviders,
    PubEaaProviders,
    QeaaProviders,
    EaaProviders { use_case: String },
    RelyingPartyRegistrars,
    RelyingPartyAccessCas,
}

/// The two service type identifiers one profile advertises.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ServiceTypePair {
    pub issuance: ServiceTypeId,
    pub revocation: ServiceTypeId,
}

/// Default service type identifiers, one issuance/revocation pair per
/// profile. EAA lists share one pair across use cases; use cases are
/// separated at the list level, not the service-type level.
pub mod service_type {
    pub const WALLET_PROVIDER: &str = "http://uri.etsi.org/TrstSvc/Svctype/EUDI/WalletProvider";
    pub const WALLET_PROVIDER_STATUS: &str =
        "http://uri.etsi.org/TrstSvc/Svctype/EUDI/WalletProvider/Status";
    pub const PID_PROVIDER: &str = "http://uri.etsi.org/TrstSvc/Svctype/EUDI/PIDProvider";
    pub const PID_PROVIDER_STATUS: &str =
        "http://uri.etsi.org/TrstSvc/Svctype/EUDI/PIDProvider/Status";
    pub const PUB_EAA_PROVIDER: &str = "http://uri.etsi.org/TrstSvc/Svctype/EUDI/PubEAAProvider";
    pub const PUB_EAA_PROVIDER_STATUS: &str =
        "http://uri.etsi.org/TrstSvc/Svctype/EUDI/PubEAAProvider/Status";
    pub const QEAA_PROVIDER: &str = "http://uri.etsi.org/TrstSvc/Svctype/EUDI/QEAAProvider";
    pub const QEAA_PROVIDER_STATUS: &str =
        "http://uri.etsi.org/TrstSvc/Svctype/EUDI/QEAAProvider/Status";
    pub const EAA_PROVIDER: &str = "http://uri.etsi.org/TrstSvc/Svctype/EUDI/EAAProvider";
    pub const EAA_PROVIDER_STATUS: &str =
        "http://uri.etsi.org/TrstSvc/Svctype/EUDI/EAAProvider/Status";
    pub const RELYING_PARTY_REGISTRAR: &str =
        "http://uri.etsi.org/TrstSvc/Svctype/EUDI/RelyingPartyRegistrar";
    pub const RELYING_PARTY_REGISTRAR_STATUS: &str =
        "http://uri.etsi.org/TrstSvc/Svctype/EUDI/RelyingPartyRegistrar/Status";
    pub const RELYING_PARTY_ACCESS_CA: &str =
        "http://uri.etsi.org/TrstSvc/Svctype/EUDI/RelyingPartyAccessCA";
    pub const RELYING_PARTY_ACCESS_CA_STATUS: &str =
        "http://uri.etsi.org/TrstSvc/Svctype/EUDI/RelyingPartyAccessCA/Status";
}

impl ListProfile {
    pub fn service_types(&self) -> ServiceTypePair {
        let (issuance, revocation) = match self {
            Self::WalletProviders => (
                service_type::WALLET_PROVIDER,
                service_type::WALLET_PROVIDER_STATUS,
            ),
            Self::PidProviders => (service_type::PID_PROVIDER, service_type::PID_PROVIDER_STATUS),
            Self::PubEaaProviders => (
                service_type::PUB_EAA_PROVIDER,
                service_type::PUB_EAA_PROVIDER_STATUS,
            ),
            Self::QeaaProviders => (
                service_type::QEAA_PROVIDER,
                service_type::QEAA_PROVIDER_STATUS,
            ),
            Self::EaaProviders { .. } => {
                (service_type::EAA_PROVIDER, service_type::EAA_PROVIDER_STATUS)
            }
            Self::RelyingPartyRegistrars => (
                service_type::RELYING_PARTY_REGISTRAR,
                service_type::RELYING_PARTY_REGISTRAR_STATUS,
            ),
            Self::RelyingPartyAccessCas => (
                service_type::RELYING_PARTY_ACCESS_CA,
                service_type::RELYING_PARTY_ACCESS_CA_STATUS,
            ),
        };
        ServiceTypePair {
            issuance: issuance.into(),
            revocation: revocation.into(),
        }
    }

    /// The closed set of purposes this profile's trusted list serves.
    pub fn purposes(&self) -> Vec<VerificationContext> {
        match self {
            Self::WalletProviders => vec![
                VerificationContext::WalletInstanceAttestation,
                VerificationContext::WalletUnitAttestation,
                VerificationContext::WalletUnitAttestationStatus,
            ],
            Self::PidProviders => {
                vec![VerificationContext::Pid, VerificationContext::PidStatus]
            }
            Self::PubEaaProviders => vec![
                VerificationContext::PubEaa,
                VerificationContext::PubEaaStatus,
            ],
            Self::QeaaProviders => {
                vec![VerificationContext::Qeaa, VerificationContext::QeaaStatus]
            }
            Self::EaaProviders { use_case } => vec![
                VerificationContext::Eaa {
                    use_case: use_case.clone(),
                },
                VerificationContext::EaaStatus {
                    use_case: use_case.clone(),
                },
            ],
            Self::RelyingPartyRegistrars => {
                vec![VerificationContext::WalletRelyingPartyRegistrationCertificate]
            }
            Self::RelyingPartyAccessCas => {
                vec![VerificationContext::WalletRelyingPartyAccessCertificate]
            }
        }
    }
}
