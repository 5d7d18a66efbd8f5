//! Example: Load rule definitions and report relay chain issues.
//!
//! Usage: `cargo run -p trawl-rules --example check-rules [RULES_DIR]`

use trawl_rules::{Action, RuleLoader};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let loader = match std::env::args().nth(1) {
        Some(dir) => RuleLoader::new(dir)?,
        None => RuleLoader::with_default_dir()?,
    };

    println!(
        "Loading rule definitions from {}...\n",
        loader.definitions_dir().display()
    );

    let rules = loader.load_rule_set()?;
    println!("✓ Loaded {} rules:\n", rules.len());

    for rule in rules.iter() {
        println!(
            "  • {} [{:?} {:?} {:?}] {}",
            rule.name(),
            rule.action(),
            rule.location(),
            rule.scope(),
            rule.triage()
        );
        if rule.action() == Action::Relay {
            match rules.relay_target(rule) {
                Ok(target) => println!("    → relays to {}", target.name()),
                Err(issue) => println!("    ✗ {issue}"),
            }
        }
    }

    let issues = rules.validate();
    if issues.is_empty() {
        println!("\n✓ No relay chain issues");
    } else {
        println!("\n✗ {} relay chain issue(s)", issues.len());
    }

    Ok(())
}
