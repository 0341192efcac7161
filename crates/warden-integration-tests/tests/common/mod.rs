//! Shared wiring for integration tests.
//!
//! Converts configuration sections into the settings of the crates they
//! configure, the way a host application wires Warden together.

use std::sync::Arc;

use warden_access::{AccessSettings, PermissionsService};
use warden_config::{AccessSection, LoggingSection};
use warden_telemetry::{LogConfig, LogFormat, TelemetryResult};
use warden_test::{MockRestrictedPatientLookup, MockStaffRoleLookup, init_test_logging};

/// Access settings from the `[access]` section.
#[allow(dead_code)]
pub fn access_settings(section: &AccessSection) -> AccessSettings {
    let mut settings =
        AccessSettings::default().with_key_worker_role_code(&section.key_worker_role_code);
    if !section.verify_supporting_prison_active {
        settings = settings.without_supporting_prison_check();
    }
    if !section.log_denials {
        settings = settings.without_denial_logging();
    }
    settings
}

/// Log config from the `[logging]` section.
#[allow(dead_code)]
pub fn log_config(section: &LoggingSection) -> TelemetryResult<LogConfig> {
    let format: LogFormat = section.format.parse()?;
    Ok(section
        .directives
        .iter()
        .fold(LogConfig::new(&section.level).with_format(format), |config, d| {
            config.with_directive(d)
        }))
}

/// A permissions service over the two mocks, which stay observable through
/// their clones.
#[allow(dead_code)]
pub struct ServiceHarness {
    /// The service under test.
    pub service: Arc<PermissionsService>,
    /// Restricted patient lookup shared with the service.
    pub restricted_patients: MockRestrictedPatientLookup,
    /// Staff role lookup shared with the service.
    pub staff_roles: MockStaffRoleLookup,
}

#[allow(dead_code)]
impl ServiceHarness {
    /// Harness with default settings and unconfigured mocks.
    pub fn new() -> Self {
        Self::with_mocks(
            MockRestrictedPatientLookup::new(),
            MockStaffRoleLookup::new(),
            AccessSettings::default(),
        )
    }

    /// Harness over pre-configured mocks.
    pub fn with_mocks(
        restricted_patients: MockRestrictedPatientLookup,
        staff_roles: MockStaffRoleLookup,
        settings: AccessSettings,
    ) -> Self {
        init_test_logging();
        let service = PermissionsService::new(
            Arc::new(restricted_patients.clone()),
            Arc::new(staff_roles.clone()),
        )
        .with_settings(settings);
        Self {
            service: Arc::new(service),
            restricted_patients,
            staff_roles,
        }
    }

    /// Upstream calls made so far, across both mocks.
    pub fn upstream_calls(&self) -> usize {
        self.restricted_patients
            .calls()
            .saturating_add(self.staff_roles.calls())
    }
}
