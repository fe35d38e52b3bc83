// ── Command API ──
//
// Every write against the router is a typed `Command`, built on the two
// remote primitives: set one field on an entry matched by another field,
// or fire a named action on a matched entry. Entities are resolved
// against the last published snapshot before anything is sent.

use serde_json::Value;

/// All supported write operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Enable or disable an interface, by key or display name.
    SetInterfaceEnabled { interface: String, enabled: bool },
    /// Enable or disable a destination-NAT rule, by its identity string.
    SetNatRuleEnabled { uniq_id: String, enabled: bool },
    /// Enable or disable a simple queue, by name.
    SetQueueEnabled { name: String, enabled: bool },
    /// Run a `/system/script` entry, by name.
    RunScript { name: String },
    /// Raw mutation primitive.
    SetValue {
        path: String,
        match_field: String,
        match_value: String,
        set_field: String,
        value: Value,
    },
}

/// What the router accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// A field was set on the entry at `path` matched by `matched`.
    Updated { path: String, matched: String },
    /// A named action ran on the entry at `path`.
    Invoked { path: String, command: String },
}

/// The router's boolean spelling for `disabled`.
pub(crate) fn disabled_value(enabled: bool) -> Value {
    Value::String(if enabled { "false" } else { "true" }.to_owned())
}
