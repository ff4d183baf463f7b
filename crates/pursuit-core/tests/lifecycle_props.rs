//! Property checks for the lifecycle policies: no-op rejection, terminal
//! sealing, and agreement between the predicate and the checked form.

use proptest::prelude::*;
use pursuit_core::lifecycle::TransitionPolicy;
use pursuit_core::model::item::Stage;

fn arb_stage() -> impl Strategy<Value = Stage> {
    proptest::sample::select(Stage::ALL.to_vec())
}

fn arb_policy() -> impl Strategy<Value = TransitionPolicy> {
    prop_oneof![
        Just(TransitionPolicy::SealedTerminal),
        Just(TransitionPolicy::ReopenAllowed),
    ]
}

proptest! {
    /// `is_legal` is exactly `check(..).is_ok()` for every input.
    #[test]
    fn predicate_agrees_with_checked_form(
        policy in arb_policy(),
        from in arb_stage(),
        to in arb_stage(),
    ) {
        prop_assert_eq!(policy.is_legal(from, to), policy.check(from, to).is_ok());
    }

    /// No policy ever accepts a no-op transition.
    #[test]
    fn noops_are_always_rejected(policy in arb_policy(), stage in arb_stage()) {
        prop_assert!(!policy.is_legal(stage, stage));
    }

    /// Under the sealed policy nothing leaves a terminal stage; every
    /// non-terminal pair except no-ops is accepted.
    #[test]
    fn sealed_terminal_is_exactly_terminal_sealing(from in arb_stage(), to in arb_stage()) {
        let legal = TransitionPolicy::SealedTerminal.is_legal(from, to);
        let expected = from != to && !from.is_terminal();
        prop_assert_eq!(legal, expected);
    }

    /// The permissive policy differs from sealed only on terminal exits.
    #[test]
    fn reopen_allowed_is_a_superset(from in arb_stage(), to in arb_stage()) {
        if TransitionPolicy::SealedTerminal.is_legal(from, to) {
            prop_assert!(TransitionPolicy::ReopenAllowed.is_legal(from, to));
        }
    }
}
