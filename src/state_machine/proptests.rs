//! Property-based tests for the dispatcher
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::DEFAULT_MARKER;
use super::*;
use crate::branch::BranchKind;
use crate::intent::{Classification, Intent};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_branch() -> impl Strategy<Value = BranchKind> {
    prop_oneof![
        Just(BranchKind::New),
        Just(BranchKind::Edit),
        Just(BranchKind::Cancel),
    ]
}

fn arb_intent() -> impl Strategy<Value = Intent> {
    prop::sample::select(Intent::ALL.to_vec())
}

/// Labels the model might answer with, including garbage
fn arb_label() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => arb_intent().prop_map(|i| i.label().to_string()),
        1 => "[a-z ]{1,20}",
    ]
}

fn arb_context() -> impl Strategy<Value = DispatchContext> {
    prop_oneof![
        Just(DispatchContext::routed(BranchExit::Sticky)),
        Just(DispatchContext::routed(BranchExit::Reclassify)),
        Just(DispatchContext::direct()),
    ]
}

/// One step of a session: a typed line, or a command
#[derive(Debug, Clone)]
enum Step {
    Say { text: String, label: String },
    Menu,
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        6 => ("[a-zA-Z ]{1,20}", arb_label()).prop_map(|(text, label)| Step::Say { text, label }),
        1 => Just(Step::Menu),
    ]
}

fn is_converse(effect: &Effect) -> bool {
    matches!(effect, Effect::Converse { .. })
}

// ============================================================================
// Driver
// ============================================================================

/// Feeds steps through the transition function the way the runtime does,
/// answering each `Classify` with the step's label. Returns every effect.
fn drive(context: &DispatchContext, steps: &[Step]) -> (DispatchState, Vec<Effect>) {
    let mut state = context.initial_state();
    let mut all = Vec::new();

    for step in steps {
        let event = match step {
            Step::Say { text, .. } => Event::UserInput { text: text.clone() },
            Step::Menu => Event::Menu,
        };
        let result = transition(&state, context, event).unwrap();
        state = result.new_state;
        for effect in result.effects {
            match (effect, step) {
                (Effect::Classify { text }, Step::Say { label, .. }) => {
                    all.push(Effect::Classify { text: text.clone() });
                    let followup = transition(
                        &state,
                        context,
                        Event::Classified {
                            text,
                            classification: Classification::from_answer(label),
                        },
                    )
                    .unwrap();
                    state = followup.new_state;
                    all.extend(followup.effects);
                }
                (effect, _) => all.push(effect),
            }
        }
    }
    (state, all)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// No valid sequence of lines and commands ever produces an invalid transition
    #[test]
    fn prop_sessions_never_hit_invalid_transitions(
        context in arb_context(),
        steps in proptest::collection::vec(arb_step(), 0..30)
    ) {
        let (state, _) = drive(&context, &steps);
        prop_assert!(!state.is_terminal());
    }

    /// In routed sessions nothing reaches a branch before the classifier has run
    #[test]
    fn prop_classifier_runs_before_any_branch(
        strategy in prop_oneof![Just(BranchExit::Sticky), Just(BranchExit::Reclassify)],
        steps in proptest::collection::vec(arb_step(), 0..30)
    ) {
        let (_, effects) = drive(&DispatchContext::routed(strategy), &steps);
        let first_converse = effects.iter().position(is_converse);
        let first_classify = effects.iter().position(|e| matches!(e, Effect::Classify { .. }));
        if let Some(converse) = first_converse {
            prop_assert!(first_classify.is_some_and(|classify| classify < converse));
        }
    }

    /// Every branch handoff carries the exact text that was typed
    #[test]
    fn prop_branches_get_the_typed_text(
        context in arb_context(),
        steps in proptest::collection::vec(arb_step(), 0..30)
    ) {
        let typed: Vec<&str> = steps
            .iter()
            .filter_map(|s| match s {
                Step::Say { text, .. } => Some(text.as_str()),
                Step::Menu => None,
            })
            .collect();
        let (_, effects) = drive(&context, &steps);
        for effect in &effects {
            if let Effect::Converse { text, .. } = effect {
                prop_assert!(typed.contains(&text.as_str()));
            }
        }
    }

    /// A branch label from the menu enters that branch with the same input
    #[test]
    fn prop_branch_label_enters_branch(branch in arb_branch(), text in "[a-z ]{1,20}") {
        let intent = Intent::ALL.into_iter().find(|i| i.branch() == Some(branch)).unwrap();
        let result = transition(
            &DispatchState::Classifying,
            &DispatchContext::routed(BranchExit::Sticky),
            Event::Classified {
                text: text.clone(),
                classification: Classification::from_answer(intent.label()),
            },
        ).unwrap();
        prop_assert_eq!(result.new_state, DispatchState::InBranch { branch });
        prop_assert_eq!(result.effects.last(), Some(&Effect::converse(branch, text)));
    }

    /// Non-branch labels leave the dispatcher classifying without calling a branch
    #[test]
    fn prop_non_branch_labels_take_default_path(label in arb_label(), text in "[a-z ]{1,20}") {
        let classification = Classification::from_answer(&label);
        prop_assume!(classification.intent.branch().is_none());
        let result = transition(
            &DispatchState::Classifying,
            &DispatchContext::routed(BranchExit::Sticky),
            Event::Classified { text, classification },
        ).unwrap();
        prop_assert_eq!(result.new_state, DispatchState::Classifying);
        prop_assert_eq!(result.effects.last(), Some(&Effect::print(DEFAULT_MARKER)));
        prop_assert!(!result.effects.iter().any(is_converse), "branch was called");
    }

    /// Any run of QA/Unclear answers followed by Cancel enters Cancel on exactly that step
    #[test]
    fn prop_unclear_then_cancel_enters_cancel(
        defaults in proptest::collection::vec(prop_oneof![Just("Unclear"), Just("QA")], 1..6)
    ) {
        let context = DispatchContext::routed(BranchExit::Sticky);
        let mut steps: Vec<Step> = defaults
            .iter()
            .map(|label| Step::Say { text: "hello".to_string(), label: (*label).to_string() })
            .collect();

        let (state, effects) = drive(&context, &steps);
        prop_assert_eq!(state, DispatchState::Classifying);
        prop_assert!(!effects.iter().any(is_converse), "branch was called before Cancel");

        steps.push(Step::Say {
            text: "cancel my reservation".to_string(),
            label: "Cancel".to_string(),
        });
        let (state, effects) = drive(&context, &steps);
        prop_assert_eq!(state, DispatchState::InBranch { branch: BranchKind::Cancel });
        prop_assert_eq!(
            effects.last(),
            Some(&Effect::converse(BranchKind::Cancel, "cancel my reservation"))
        );
    }

    /// Sticky branches hold the conversation until /menu whatever the user says
    #[test]
    fn prop_sticky_branch_holds(
        branch in arb_branch(),
        texts in proptest::collection::vec("[a-zA-Z ]{1,20}", 1..10)
    ) {
        let context = DispatchContext::routed(BranchExit::Sticky);
        let mut state = DispatchState::InBranch { branch };
        for text in texts {
            let result = transition(&state, &context, Event::UserInput { text: text.clone() }).unwrap();
            prop_assert_eq!(result.effects, vec![Effect::converse(branch, text)]);
            state = result.new_state;
        }
        prop_assert_eq!(state, DispatchState::InBranch { branch });
    }

    /// Menu always returns a routed session to classifying
    #[test]
    fn prop_menu_returns_to_classifying(
        strategy in prop_oneof![Just(BranchExit::Sticky), Just(BranchExit::Reclassify)],
        steps in proptest::collection::vec(arb_step(), 0..20)
    ) {
        let context = DispatchContext::routed(strategy);
        let mut steps = steps;
        steps.push(Step::Menu);
        let (state, _) = drive(&context, &steps);
        prop_assert_eq!(state, DispatchState::Classifying);
    }

    /// Once finished, the dispatcher accepts nothing
    #[test]
    fn prop_quit_is_final(context in arb_context(), text in "[a-z]{1,10}") {
        let result = transition(&context.initial_state(), &context, Event::Quit).unwrap();
        prop_assert_eq!(result.new_state, DispatchState::Done);
        prop_assert_eq!(result.effects, vec![Effect::Exit]);
        for event in [Event::UserInput { text }, Event::Menu, Event::Quit] {
            prop_assert_eq!(
                transition(&DispatchState::Done, &context, event).unwrap_err(),
                TransitionError::SessionEnded
            );
        }
    }
}
