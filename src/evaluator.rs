//! Response-completeness evaluation against an attachment-count policy.
//!
//! This is the one piece of real decision logic in the question type:
//!   - `evaluate` decides whether a submission is complete enough to grade
//!   - `progress_of` picks the mutually exclusive progress state shown in
//!     the upload widget
//!   - `same_response` decides whether two submissions count as the same
//!     answer (text only; attachments never compare equal)
//!
//! Everything here is pure; callers resolve counts and templates first.

use thiserror::Error;

use crate::domain::{AttachmentPolicy, CompletenessResult, Progress, ResponseSubmission};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvalError {
  #[error("invalid attachment policy: required_count {required_count} (allowed: -1, 0, 1, 2, ...)")]
  InvalidPolicy { required_count: i32 },
  #[error("invalid submission: attached_count {attached_count} is negative")]
  InvalidSubmission { attached_count: i64 },
}

/// Decide completeness and progress for one submission.
pub fn evaluate(policy: AttachmentPolicy, submission: &ResponseSubmission) -> CompletenessResult {
  CompletenessResult {
    complete: is_complete(policy, submission.attached_count()),
    progress: progress_of(policy, submission.attached_count()),
  }
}

fn is_complete(policy: AttachmentPolicy, attached: u32) -> bool {
  let required = policy.required_count();
  // A question that accepts no attachments is text-only and always gradable.
  if required == 0 {
    return true;
  }
  if attached == 0 {
    // Text alone never satisfies a file requirement.
    return false;
  }
  if policy.is_unlimited() {
    // Unlimited, but at least one: any file will do.
    return true;
  }
  attached >= required as u32
}

/// Pick the progress state, independent of completeness. The case split
/// follows required-count first, then the attached count, with uploads past
/// the requirement collapsing into the generic plural state.
pub fn progress_of(policy: AttachmentPolicy, attached: u32) -> Progress {
  match policy.required_count() {
    0 => Progress::Nothing,
    -1 => match attached {
      0 => Progress::Nothing,
      1 => Progress::OneUnlimited,
      n => Progress::Uploaded { count: n },
    },
    1 => match attached {
      0 => Progress::NoneOfOne,
      1 => Progress::OneOfOne,
      // More files than required; reported, not rejected.
      n => Progress::Uploaded { count: n },
    },
    required => {
      let required = required as u32;
      match attached {
        0 => Progress::NoneOfN { required },
        1 => Progress::OneOfN { required },
        n if n > required => Progress::Uploaded { count: n },
        n => Progress::KOfN { count: n, required },
      }
    }
  }
}

/// Two submissions are the same answer when their texts agree after the
/// configured response template has been substituted for an absent-or-empty
/// value. Attachments never compare equal, so a file reference on either
/// side makes the submissions differ.
pub fn same_response(
  template: &str,
  prev_text: Option<&str>,
  prev_has_attachments: bool,
  new_text: Option<&str>,
  new_has_attachments: bool,
) -> bool {
  if prev_has_attachments || new_has_attachments {
    return false;
  }
  effective_text(template, prev_text) == effective_text(template, new_text)
}

fn effective_text<'a>(template: &'a str, text: Option<&'a str>) -> &'a str {
  match text {
    Some(s) if !s.is_empty() => s,
    _ => template,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn policy(n: i32) -> AttachmentPolicy {
    AttachmentPolicy::new(n).unwrap()
  }

  fn submission(attached: i64) -> ResponseSubmission {
    ResponseSubmission::new(None, attached).unwrap()
  }

  #[test]
  fn zero_required_is_always_complete() {
    for attached in [0, 1, 7] {
      let r = evaluate(policy(0), &submission(attached));
      assert!(r.complete, "attached={attached}");
      assert_eq!(r.progress, Progress::Nothing);
    }
  }

  #[test]
  fn unlimited_needs_at_least_one_file() {
    let r = evaluate(policy(-1), &submission(0));
    assert!(!r.complete);
    assert_eq!(r.progress, Progress::Nothing);

    let r = evaluate(policy(-1), &submission(1));
    assert!(r.complete);
    assert_eq!(r.progress, Progress::OneUnlimited);

    let r = evaluate(policy(-1), &submission(4));
    assert!(r.complete);
    assert_eq!(r.progress, Progress::Uploaded { count: 4 });
  }

  #[test]
  fn exact_count_compares_against_requirement() {
    for (required, attached, expect) in [
      (1, 0, false),
      (1, 1, true),
      (2, 1, false),
      (2, 2, true),
      (3, 2, false),
      (3, 5, true),
    ] {
      let r = evaluate(policy(required), &submission(attached));
      assert_eq!(r.complete, expect, "required={required} attached={attached}");
    }
  }

  #[test]
  fn one_required_progress_states() {
    assert_eq!(progress_of(policy(1), 0), Progress::NoneOfOne);
    assert_eq!(progress_of(policy(1), 1), Progress::OneOfOne);
    // Anomaly: more files than required falls back to the plural state.
    assert_eq!(progress_of(policy(1), 3), Progress::Uploaded { count: 3 });
  }

  #[test]
  fn n_required_progress_states_carry_both_counts() {
    assert_eq!(progress_of(policy(3), 0), Progress::NoneOfN { required: 3 });
    assert_eq!(progress_of(policy(3), 1), Progress::OneOfN { required: 3 });
    assert_eq!(progress_of(policy(3), 2), Progress::KOfN { count: 2, required: 3 });
    assert_eq!(progress_of(policy(3), 3), Progress::KOfN { count: 3, required: 3 });
    assert_eq!(progress_of(policy(3), 4), Progress::Uploaded { count: 4 });
  }

  #[test]
  fn two_of_three_is_incomplete_with_k_of_n() {
    let r = evaluate(policy(3), &submission(2));
    assert!(!r.complete);
    assert_eq!(r.progress, Progress::KOfN { count: 2, required: 3 });
  }

  #[test]
  fn malformed_inputs_are_rejected() {
    assert_eq!(
      AttachmentPolicy::new(-2).unwrap_err(),
      EvalError::InvalidPolicy { required_count: -2 }
    );
    assert_eq!(
      ResponseSubmission::new(None, -1).unwrap_err(),
      EvalError::InvalidSubmission { attached_count: -1 }
    );
  }

  #[test]
  fn same_response_with_empty_template() {
    assert!(same_response("", None, false, Some(""), false));
    assert!(same_response("", Some(""), false, Some(""), false));
    assert!(same_response("", Some(""), false, None, false));
    assert!(!same_response("", Some("Hello"), false, None, false));
    assert!(!same_response("", Some("Hello"), false, Some(""), false));
    assert!(!same_response("", Some("0"), false, Some(""), false));
    assert!(!same_response("", Some(""), false, Some("0"), false));
  }

  #[test]
  fn same_response_substitutes_template_for_missing_text() {
    let tpl = "Once upon a time";
    assert!(same_response(tpl, None, false, Some("Once upon a time"), false));
    assert!(same_response(tpl, Some("Once upon a time"), false, None, false));
    assert!(same_response(tpl, None, false, None, false));
    assert!(!same_response(tpl, None, false, Some("The end"), false));
  }

  #[test]
  fn same_response_is_symmetric_and_reflexive() {
    let cases: [(Option<&str>, Option<&str>); 3] =
      [(Some("a"), Some("a")), (None, Some("")), (Some("x"), None)];
    for (a, b) in cases {
      assert_eq!(
        same_response("t", a, false, b, false),
        same_response("t", b, false, a, false)
      );
      assert!(same_response("t", a, false, a, false));
    }
  }

  #[test]
  fn attachments_never_compare_equal() {
    assert!(!same_response("", Some("same"), true, Some("same"), true));
    assert!(!same_response("", None, false, None, true));
    assert!(!same_response("", None, true, None, false));
  }
}
