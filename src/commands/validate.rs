//! `provision validate` - load and validate without probing the machine

use anyhow::Result;
use declarative::Plan;

use super::load;
use crate::Context;
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    let loaded = load(ctx)?;
    ui::success(&format!(
        "{} is valid: {}",
        loaded.path.display(),
        describe_counts(&loaded.plan)
    ));
    Ok(())
}

fn describe_counts(plan: &Plan) -> String {
    let deferred = plan.iter().filter(|d| d.deferred).count();
    let noun = if plan.len() == 1 { "resource" } else { "resources" };
    if deferred == 0 {
        format!("{} {noun}", plan.len())
    } else {
        format!("{} {noun} ({deferred} deferred)", plan.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Execute;
    use declarative::Declaration;

    #[test]
    fn test_describe_counts() {
        let one = Plan::new(vec![Declaration::new("a", Execute::new(["true"]))]).unwrap();
        assert_eq!(describe_counts(&one), "1 resource");

        let two = Plan::new(vec![
            Declaration::new("a", Execute::new(["true"])).notifies("b"),
            Declaration::new("b", Execute::new(["true"])).deferred(),
        ])
        .unwrap();
        assert_eq!(describe_counts(&two), "2 resources (1 deferred)");
    }
}
