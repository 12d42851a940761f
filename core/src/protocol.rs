//! Connection-kind tags exchanged once, at the start of a TCP connection
//! to the broker, before the session settles into either a worker's
//! register-then-serve loop or a client's one-shot request/lookup.

/// Sent by a worker right after connecting: `[WRK, <service-name>]`.
pub const TAG_WORKER_REGISTER: &str = "WRK";

/// Sent by a client to invoke a service: `[REQ, <service-name>, <payload frames...>]`.
pub const TAG_REQUEST: &str = "REQ";

/// Sent by a client to query the management interface: `[MGMT, <service-name>]`.
pub const TAG_MGMT_LOOKUP: &str = "MGMT";
