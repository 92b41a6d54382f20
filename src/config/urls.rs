//! Management server REST endpoints

/// List of applications visible to the user
pub const APPLICATIONS: &str = "/kaaAdmin/rest/api/applications";

/// SDK profiles of an application, followed by `/<applicationToken>`
pub const SDK_PROFILES: &str = "/kaaAdmin/rest/api/sdkProfiles";

/// SDK generation endpoint
pub const SDK: &str = "/kaaAdmin/rest/api/sdk";
