//! Clinical ports - read-only directory lookups

use async_trait::async_trait;

use core_kernel::{DomainPort, PatientId, PortError};

/// Read-only access to the patient directory
///
/// Used for display text only; a directory failure degrades to id-based
/// text and never fails a clinical write.
#[async_trait]
pub trait PatientDirectory: DomainPort {
    /// Returns the patient's display name, if the directory knows them
    async fn patient_name(&self, id: PatientId) -> Result<Option<String>, PortError>;
}
