//! engine::staging
//!
//! Deciding what gets committed.
//!
//! Nothing here touches the index. The result is a [`Staging`] value that
//! the commit step applies after every prompt has been answered, so a
//! cancel at any later prompt still leaves the repository as it was.

use super::EngineError;
use crate::core::types::StagePlan;
use crate::git::Vcs;
use crate::ui::prompts::{Choice, PromptError, Prompter};

pub const STAGE_PROMPT: &str = "Would you like to stage changes before committing?";
pub const STAGE_ALL_LABEL: &str = "✅ Yes, stage all changes";
pub const STAGE_SELECT_LABEL: &str = "📂 Select specific files to stage";
pub const STAGE_CANCEL_LABEL: &str = "❌ No, cancel commit";

pub const FILE_PROMPT: &str = "Select files to stage (space to select, enter to confirm):";

/// What to stage and which files end up in the commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Staging {
    pub plan: StagePlan,
    pub files: Vec<String>,
}

impl Staging {
    /// Run the plan against `vcs`.
    pub fn apply(&self, vcs: &dyn Vcs) -> Result<(), EngineError> {
        match &self.plan {
            StagePlan::Nothing => {}
            StagePlan::All => vcs.stage_all()?,
            StagePlan::Files(files) => vcs.stage_files(files)?,
        }
        Ok(())
    }
}

/// Work out the staging plan for a real commit.
///
/// Already-staged files win; otherwise the user is asked.
pub fn plan(vcs: &dyn Vcs, prompter: &mut dyn Prompter) -> Result<Staging, EngineError> {
    let staged = vcs.staged_files()?;
    if !staged.is_empty() {
        return Ok(Staging {
            plan: StagePlan::Nothing,
            files: staged,
        });
    }

    let unstaged = vcs.unstaged_files()?;
    if unstaged.is_empty() {
        return Err(EngineError::NothingToCommit);
    }

    let choices = [
        Choice::new(STAGE_ALL_LABEL),
        Choice::new(STAGE_SELECT_LABEL),
        Choice::new(STAGE_CANCEL_LABEL),
    ];
    match prompter.select(STAGE_PROMPT, &choices)? {
        0 => Ok(Staging {
            plan: StagePlan::All,
            files: unstaged,
        }),
        1 => {
            let files = select_files(&unstaged, prompter)?;
            if files.is_empty() {
                return Err(EngineError::NoFilesSelected);
            }
            let plan = if files.len() == unstaged.len() {
                StagePlan::All
            } else {
                StagePlan::Files(files.clone())
            };
            Ok(Staging { plan, files })
        }
        _ => Err(PromptError::Cancelled.into()),
    }
}

/// File multiselect with a leading "stage all" entry.
///
/// Picking the "stage all" entry returns every file without a confirmation.
/// Otherwise the user confirms the count; declining returns an empty list.
pub fn select_files(
    unstaged: &[String],
    prompter: &mut dyn Prompter,
) -> Result<Vec<String>, EngineError> {
    let mut choices = Vec::with_capacity(unstaged.len() + 1);
    choices.push(Choice::with_hint(
        "📦 Stage All Files",
        format!("({} files)", unstaged.len()),
    ));
    choices.extend(unstaged.iter().map(Choice::new));

    let picked = prompter.multiselect(FILE_PROMPT, &choices)?;
    if picked.contains(&0) {
        return Ok(unstaged.to_vec());
    }
    if picked.is_empty() {
        return Ok(Vec::new());
    }

    let files: Vec<String> = picked.iter().map(|i| unstaged[i - 1].clone()).collect();
    let confirmed = prompter.confirm(
        &format!("Are you sure you want to stage {} file(s)?", files.len()),
        true,
    )?;
    Ok(if confirmed { files } else { Vec::new() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::{MockVcs, VcsOperation};
    use crate::ui::scripted::{Answer, ScriptedPrompter};

    #[test]
    fn staged_files_skip_the_question() {
        let vcs = MockVcs::new().with_staged(["a.rs"]).with_unstaged(["b.rs"]);
        let mut prompter = ScriptedPrompter::default();

        let staging = plan(&vcs, &mut prompter).unwrap();
        assert_eq!(staging.plan, StagePlan::Nothing);
        assert_eq!(staging.files, vec!["a.rs"]);
        assert!(prompter.asked().is_empty());
    }

    #[test]
    fn clean_tree_is_nothing_to_commit() {
        let vcs = MockVcs::new();
        let mut prompter = ScriptedPrompter::default();
        assert!(matches!(
            plan(&vcs, &mut prompter),
            Err(EngineError::NothingToCommit)
        ));
    }

    #[test]
    fn stage_all_choice() {
        let vcs = MockVcs::new().with_unstaged(["a.rs", "b.rs"]);
        let mut prompter = ScriptedPrompter::new([Answer::Select(0)]);

        let staging = plan(&vcs, &mut prompter).unwrap();
        assert_eq!(staging.plan, StagePlan::All);
        assert!(vcs.operations().is_empty(), "planning must not stage");

        staging.apply(&vcs).unwrap();
        assert_eq!(vcs.operations(), vec![VcsOperation::StageAll]);
    }

    #[test]
    fn no_choice_cancels() {
        let vcs = MockVcs::new().with_unstaged(["a.rs"]);
        let mut prompter = ScriptedPrompter::new([Answer::Select(2)]);
        assert!(matches!(
            plan(&vcs, &mut prompter),
            Err(EngineError::Prompt(PromptError::Cancelled))
        ));
    }

    #[test]
    fn stage_all_entry_in_multiselect_picks_everything() {
        let vcs = MockVcs::new().with_unstaged(["a.rs", "b.rs"]);
        let mut prompter = ScriptedPrompter::new([Answer::Select(1), Answer::Multi(vec![0, 2])]);

        let staging = plan(&vcs, &mut prompter).unwrap();
        assert_eq!(staging.plan, StagePlan::All);
        assert_eq!(staging.files, vec!["a.rs", "b.rs"]);
        assert!(prompter.is_exhausted());
    }

    #[test]
    fn partial_selection_is_confirmed() {
        let vcs = MockVcs::new().with_unstaged(["a.rs", "b.rs", "c.rs"]);
        let mut prompter = ScriptedPrompter::new([
            Answer::Select(1),
            Answer::Multi(vec![1, 3]),
            Answer::Confirm(true),
        ]);

        let staging = plan(&vcs, &mut prompter).unwrap();
        assert_eq!(
            staging.plan,
            StagePlan::Files(vec!["a.rs".into(), "c.rs".into()])
        );
        assert_eq!(
            prompter.asked().last().map(String::as_str),
            Some("Are you sure you want to stage 2 file(s)?")
        );
    }

    #[test]
    fn declined_confirmation_means_no_files() {
        let vcs = MockVcs::new().with_unstaged(["a.rs", "b.rs"]);
        let mut prompter = ScriptedPrompter::new([
            Answer::Select(1),
            Answer::Multi(vec![1]),
            Answer::Confirm(false),
        ]);
        assert!(matches!(
            plan(&vcs, &mut prompter),
            Err(EngineError::NoFilesSelected)
        ));
    }

    #[test]
    fn empty_selection_means_no_files() {
        let vcs = MockVcs::new().with_unstaged(["a.rs"]);
        let mut prompter = ScriptedPrompter::new([Answer::Select(1), Answer::Multi(vec![])]);
        assert!(matches!(
            plan(&vcs, &mut prompter),
            Err(EngineError::NoFilesSelected)
        ));
    }
}
