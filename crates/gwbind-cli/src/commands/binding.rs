use anyhow::{Context, Result};
use gwbind_arm::ArmTransport;
use gwbind_core::{BindingReconciler, BindingState};
use gwbind_cli::files::{load_binding, load_state, remove_state, save_state};

use crate::cli::{CreateArgs, DeleteArgs, ReadArgs, UpdateArgs};
use crate::output::{print_entities, print_state, print_success, print_warning};

type Reconciler = BindingReconciler<ArmTransport>;

pub async fn create(reconciler: &Reconciler, args: &CreateArgs) -> Result<()> {
    let binding = load_binding(&args.binding)?;
    let state = reconciler
        .create(&binding)
        .await
        .with_context(|| format!("Failed to create binding '{}'", binding.name))?;
    save_state(&args.state, &state)?;

    print_success(&format!(
        "Created binding '{}' on {}",
        state.name, state.gateway
    ));
    print_entities(&state, &BindingState::from(&binding));
    Ok(())
}

pub async fn read(reconciler: &Reconciler, args: &ReadArgs) -> Result<()> {
    let prior = load_state(&args.state)?;
    let state = reconciler
        .read(&prior)
        .await
        .with_context(|| format!("Failed to read binding '{}'", prior.name))?;

    let missing = state.missing_from(&prior);
    if !missing.is_empty() {
        let slots: Vec<String> = missing.iter().map(ToString::to_string).collect();
        print_warning(&format!(
            "Binding '{}' has drifted: {} missing from {}",
            state.name,
            slots.join(", "),
            state.gateway
        ));
    }
    print_state(&state)?;
    if args.save {
        save_state(&args.state, &state)?;
    }
    Ok(())
}

pub async fn update(reconciler: &Reconciler, args: &UpdateArgs) -> Result<()> {
    let prior = load_state(&args.state)?;
    let plan = load_binding(&args.binding)?;
    let state = reconciler
        .update(&prior, &plan)
        .await
        .with_context(|| format!("Failed to update binding '{}'", plan.name))?;
    save_state(&args.state, &state)?;

    print_success(&format!(
        "Updated binding '{}' on {}",
        state.name, state.gateway
    ));
    print_entities(&state, &BindingState::from(&plan));
    Ok(())
}

pub async fn delete(reconciler: &Reconciler, args: &DeleteArgs) -> Result<()> {
    let prior = load_state(&args.state)?;
    reconciler
        .delete(&prior)
        .await
        .with_context(|| format!("Failed to delete binding '{}'", prior.name))?;
    remove_state(&args.state)?;

    print_success(&format!(
        "Deleted binding '{}' from {} ({} entities)",
        prior.name,
        prior.gateway,
        prior.recorded().len()
    ));
    Ok(())
}
