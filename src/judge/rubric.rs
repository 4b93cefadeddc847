//! Fixed rubric text wrapped around each prompt and continuation.

/// Delimiter the judge is told separates the prescribed beginning from the
/// student's completion.
pub const SEPARATOR: &str = "***";

pub const PREAMBLE: &str = "The following exercise, the student is given the beginning of a story. \
The student needs to complete it into a full story. The exercise tests the student's language \
abilities and creativity. The symbol *** marks the separator between the prescribed beginning \
and the student's completion: ";

pub const ASSESSMENT_INSTRUCTIONS: &str = "Please provide your general assessment about the part \
written by the student (the one after the *** symbol). Only give the ratings without description \
and overall could be omitted. Do not give explanations for the ratings. Give them in one single \
line, separated by semi-colon. Keep the fields for the output consistent, that is keep all the \
fields mentioned in the next sentence. Grammar: ; Consistency: ; Creativity: ; Plot: ; Age group: \
Is it grammatically correct? Is it consistent with the beginning of the story? Pay special \
attention to whether the student manages to complete the sentence which is split in the middle \
by the separator ***.";

pub const GRADING_INSTRUCTIONS: &str = "Now, grade the student's completion in terms of grammar, \
creativity, consistency with the story's beginning and whether the plot makes sense. Moreover, \
please provide your best guess of what the age of the student might be, as reflected from the \
completion. Choose from possible age groups: A: 3 or under. B: 4-5. C: 6-7. D: 8-9. E: 10-12. \
F: 13-16. e.g. Grammar: 8/10; Consistency: 7/10; Creativity: 7/10; Plot: 7/10; Age group: E (10-12)";

/// Builds the full judge payload for one prompt and its continuation.
pub fn compose(prompt: &str, continuation: &str) -> String {
    format!(
        "{PREAMBLE}{prompt} Story begins here:{SEPARATOR}  {continuation}. {SEPARATOR} The story ends here\n{ASSESSMENT_INSTRUCTIONS}\n{GRADING_INSTRUCTIONS}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_orders_sections() {
        let payload = compose("Once upon a time", "there was a fox");
        let preamble = payload.find("The following exercise").expect("preamble");
        let prompt = payload.find("Once upon a time").expect("prompt");
        let story = payload.find("***  there was a fox. ***").expect("continuation");
        let assessment = payload.find("Please provide your general").expect("assessment");
        let grading = payload.find("Now, grade").expect("grading");
        assert!(preamble < prompt && prompt < story && story < assessment && assessment < grading);
    }

    #[test]
    fn grading_lists_every_age_bracket() {
        for bracket in ["A: 3 or under", "B: 4-5", "C: 6-7", "D: 8-9", "E: 10-12", "F: 13-16"] {
            assert!(GRADING_INSTRUCTIONS.contains(bracket), "missing {bracket}");
        }
    }
}
