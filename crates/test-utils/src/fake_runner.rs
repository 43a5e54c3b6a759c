use std::sync::{Arc, Mutex};

use sitebuild::exec::{CommandOutput, CommandRunner, CommandSpec, RunFuture};

type Responder = dyn Fn(&CommandSpec) -> CommandOutput + Send + Sync;

/// A fake command runner that:
/// - records every command it is asked to run, in order
/// - answers each one through a responder closure (success by default).
///
/// Clones share the same log.
#[derive(Clone)]
pub struct RecordingRunner {
    calls: Arc<Mutex<Vec<CommandSpec>>>,
    responder: Arc<Responder>,
}

impl Default for RecordingRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingRunner {
    /// Every command succeeds with empty output.
    pub fn new() -> Self {
        Self::with_responder(|_| CommandOutput::success(""))
    }

    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&CommandSpec) -> CommandOutput + Send + Sync + 'static,
    {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            responder: Arc::new(responder),
        }
    }

    /// Commands whose rendered line contains `needle` exit with `code`.
    pub fn failing_when(needle: &str, code: i32, stderr: &str) -> Self {
        let needle = needle.to_string();
        let stderr = stderr.to_string();
        Self::with_responder(move |spec| {
            if spec.to_string().contains(&needle) {
                CommandOutput::failure(code, stderr.clone())
            } else {
                CommandOutput::success("")
            }
        })
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded commands rendered as shell-like lines.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(ToString::to_string).collect()
    }

    /// `git` subcommands (or `ssh`) in the order they ran.
    pub fn steps(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|spec| match spec.program.as_str() {
                "git" => spec.subcommand().unwrap_or("").to_string(),
                other => other.to_string(),
            })
            .collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run<'a>(&'a self, spec: &'a CommandSpec) -> RunFuture<'a> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(spec.clone());
            Ok((self.responder)(spec))
        })
    }
}

/// State behind [`FakeGit`].
#[derive(Debug, Clone)]
pub struct FakeGitState {
    /// Local `refs/heads/<release branch>`, updated by `update-ref`.
    pub branch_head: Option<String>,
    /// Whether `ls-remote` reports the release branch on the host.
    pub remote_has_branch: bool,
    /// Commit `fetch` brings in when the remote has the branch.
    pub remote_head: String,
    /// `HEAD` of the working tree.
    pub source_head: String,
    pub git_dir: String,
    /// Subcommand (or `ssh`) that exits 128.
    pub fail_on: Option<String>,
    /// Release commits created so far; names the next one.
    pub commits: usize,
}

impl Default for FakeGitState {
    fn default() -> Self {
        Self {
            branch_head: None,
            remote_has_branch: false,
            remote_head: "remote-head".to_string(),
            source_head: "source-head".to_string(),
            git_dir: "/site/.git".to_string(),
            fail_on: None,
            commits: 0,
        }
    }
}

/// Just enough of `git` and `ssh` to drive a release end to end.
///
/// Release commits are named `release-1`, `release-2`, ... and the tree is
/// always `tree-1`.
#[derive(Clone, Default)]
pub struct FakeGit {
    state: Arc<Mutex<FakeGitState>>,
}

impl FakeGit {
    pub fn new(state: FakeGitState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn state(&self) -> FakeGitState {
        self.state.lock().unwrap().clone()
    }

    pub fn runner(&self) -> RecordingRunner {
        let state = Arc::clone(&self.state);
        RecordingRunner::with_responder(move |spec| respond(&mut state.lock().unwrap(), spec))
    }
}

fn respond(state: &mut FakeGitState, spec: &CommandSpec) -> CommandOutput {
    let step = match spec.program.as_str() {
        "git" => spec.subcommand().unwrap_or(""),
        other => other,
    };
    if state.fail_on.as_deref() == Some(step) {
        return CommandOutput::failure(128, format!("fatal: {step} failed"));
    }
    if spec.program != "git" {
        return CommandOutput::success("");
    }

    let last = spec.args.last().map(String::as_str).unwrap_or("");
    match step {
        "rev-parse" if spec.args.iter().any(|a| a == "--absolute-git-dir") => {
            CommandOutput::success(format!("{}\n", state.git_dir))
        }
        "rev-parse" => {
            let rev = last.trim_end_matches("^{commit}");
            let resolved = if rev == "HEAD" {
                Some(state.source_head.clone())
            } else {
                state.branch_head.clone()
            };
            match resolved {
                Some(sha) => CommandOutput::success(format!("{sha}\n")),
                None => CommandOutput::failure(1, ""),
            }
        }
        "ls-remote" if state.remote_has_branch => {
            CommandOutput::success(format!("{}\t{last}\n", state.remote_head))
        }
        "ls-remote" => CommandOutput::failure(2, ""),
        "fetch" => {
            state.branch_head = Some(state.remote_head.clone());
            CommandOutput::success("")
        }
        "write-tree" => CommandOutput::success("tree-1\n"),
        "commit-tree" => {
            state.commits += 1;
            CommandOutput::success(format!("release-{}\n", state.commits))
        }
        "update-ref" => {
            state.branch_head = spec.args.get(2).cloned();
            CommandOutput::success("")
        }
        _ => CommandOutput::success(""),
    }
}
