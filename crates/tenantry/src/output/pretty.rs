//! Pretty output formatting.

use tenantry_core::entity::{PaymentChannel, Quota, Space};

/// Format a space for display.
pub fn format_space(space: &Space) -> String {
    let mut output = format!(
        "{} ({})\n  ID: {}\n  Owner: {}\n  Status: {}",
        space.name,
        space.slug,
        space.id,
        space.owner_id,
        space.status.as_str()
    );
    if let Some(desc) = &space.description {
        output.push_str(&format!("\n  Description: {desc}"));
    }
    output
}

/// Format spaces for display.
pub fn format_spaces(spaces: &[Space]) -> String {
    format_list("SPACES", "No spaces found.", spaces, format_space)
}

/// Format a payment channel for display.
pub fn format_channel(channel: &PaymentChannel) -> String {
    let mut flags = Vec::new();
    if channel.is_default {
        flags.push("default");
    }
    if !channel.enabled {
        flags.push("disabled");
    }
    let mut output = format!(
        "{} [{}]\n  ID: {}\n  Tenant: {}",
        channel.name, channel.provider, channel.id, channel.tenant_id
    );
    if !flags.is_empty() {
        output.push_str(&format!("\n  Flags: {}", flags.join(", ")));
    }
    output
}

/// Format payment channels for display.
pub fn format_channels(channels: &[PaymentChannel]) -> String {
    format_list("CHANNELS", "No channels found.", channels, format_channel)
}

/// Format a quota for display.
pub fn format_quota(quota: &Quota) -> String {
    format!(
        "{}: {}/{} used ({} left)\n  ID: {}\n  Space: {}",
        quota.resource,
        quota.used,
        quota.limit,
        quota.remaining(),
        quota.id,
        quota.space_id
    )
}

/// Format quotas for display.
pub fn format_quotas(quotas: &[Quota]) -> String {
    format_list("QUOTAS", "No quotas found.", quotas, format_quota)
}

fn format_list<T>(title: &str, empty: &str, items: &[T], render: fn(&T) -> String) -> String {
    if items.is_empty() {
        return empty.to_string();
    }
    let mut output = format!("{title} ({})\n", items.len());
    output.push_str(&"-".repeat(40));
    for item in items {
        output.push_str(&format!("\n{}", render(item)));
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_format_space() {
        let space = Space::new("acme", "Acme", Uuid::new_v4()).with_description("Widgets");
        let output = format_space(&space);
        assert!(output.starts_with("Acme (acme)"));
        assert!(output.contains("Status: active"));
        assert!(output.contains("Description: Widgets"));
    }

    #[test]
    fn test_format_default_channel() {
        let channel = PaymentChannel::new(Uuid::new_v4(), "stripe", "Main").as_default();
        let output = format_channel(&channel);
        assert!(output.starts_with("Main [stripe]"));
        assert!(output.contains("Flags: default"));
    }

    #[test]
    fn test_format_quota() {
        let quota = Quota::new(Uuid::new_v4(), "seats", 10).with_used(4);
        assert!(format_quota(&quota).starts_with("seats: 4/10 used (6 left)"));
    }

    #[test]
    fn test_empty_lists() {
        assert_eq!(format_spaces(&[]), "No spaces found.");
        assert_eq!(format_quotas(&[]), "No quotas found.");
    }
}
