//! Implementation of the `conductor agents` command.

use super::Session;
use crate::error::Result;

/// List registered agents with their availability.
pub(crate) fn cmd_agents(session: &Session) -> Result<()> {
    let registry = session.orchestrator.registry();

    if registry.is_empty() {
        println!("No agents registered. Add agents to conductor.yaml.");
        return Ok(());
    }

    println!("Agent Registry");
    println!("==============");
    println!();

    let mut active = Vec::new();
    let mut inactive = Vec::new();
    for agent in registry.iter() {
        let status = if agent.available { "active" } else { "inactive" };
        println!(
            "  {:12} {:9} {}",
            agent.name, status, agent.description
        );
        println!("  {:12} {:9} {}", "", "", agent.executable_path.display());

        if agent.available {
            active.push(agent.name.as_str());
        } else {
            inactive.push(agent.name.as_str());
        }
    }

    println!();
    println!("Active ({}): {}", active.len(), join_or_none(&active));
    println!("Inactive ({}): {}", inactive.len(), join_or_none(&inactive));
    Ok(())
}

fn join_or_none(names: &[&str]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}
