//! A buildable module: task graph, extensions, source sets, applied conventions.

use crate::context::BuildContext;
use crate::convention::Convention;
use crate::error::ConfigurationError;
use crate::extension::Extensions;
use crate::graph::{TaskGraph, TaskKind};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Name of the aggregate verification task.
pub const CHECK_TASK: &str = "check";

/// A named group of source directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSet {
    /// Source set name (`main`, `test`).
    pub name: String,
    /// Source directories, relative to the module directory.
    pub dirs: Vec<PathBuf>,
}

impl SourceSet {
    /// Conventional layout: `src/<name>/java` and `src/<name>/kotlin`.
    #[must_use]
    pub fn conventional(name: &str) -> Self {
        Self {
            name: name.to_string(),
            dirs: vec![
                PathBuf::from("src").join(name).join("java"),
                PathBuf::from("src").join(name).join("kotlin"),
            ],
        }
    }

    /// Task-name suffix for this set (`main` becomes `Main`).
    #[must_use]
    pub fn task_suffix(&self) -> String {
        let mut chars = self.name.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
        })
    }
}

/// One module of a multi-module project.
#[derive(Debug)]
pub struct Module {
    name: String,
    dir: PathBuf,
    tasks: TaskGraph,
    extensions: Extensions,
    source_sets: BTreeMap<String, SourceSet>,
    applied: BTreeSet<String>,
    applying: Vec<String>,
}

impl Module {
    /// Creates an empty module rooted at `dir`.
    #[must_use]
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            tasks: TaskGraph::new(),
            extensions: Extensions::new(),
            source_sets: BTreeMap::new(),
            applied: BTreeSet::new(),
            applying: Vec::new(),
        }
    }

    /// Module name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Module directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Build output directory (`<module>/build`).
    #[must_use]
    pub fn build_dir(&self) -> PathBuf {
        self.dir.join("build")
    }

    /// Task graph.
    #[must_use]
    pub fn tasks(&self) -> &TaskGraph {
        &self.tasks
    }

    /// Mutable task graph.
    pub fn tasks_mut(&mut self) -> &mut TaskGraph {
        &mut self.tasks
    }

    /// Extension container.
    #[must_use]
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Mutable extension container.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Registers a source set unless one with the same name exists.
    pub fn add_source_set(&mut self, source_set: SourceSet) {
        self.source_sets
            .entry(source_set.name.clone())
            .or_insert(source_set);
    }

    /// Source sets, ordered by name.
    pub fn source_sets(&self) -> impl Iterator<Item = &SourceSet> {
        self.source_sets.values()
    }

    /// Source set by name.
    #[must_use]
    pub fn source_set(&self, name: &str) -> Option<&SourceSet> {
        self.source_sets.get(name)
    }

    /// Files of `set` whose extension is one of `extensions`, sorted.
    /// Symlinks are followed.
    ///
    /// # Errors
    ///
    /// Returns the first error hit while walking a source directory, such
    /// as an unreadable directory or a symlink loop.
    pub fn source_files(
        &self,
        set: &SourceSet,
        extensions: &[&str],
    ) -> std::io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for dir in &set.dirs {
            let root = self.dir.join(dir);
            if !root.is_dir() {
                continue;
            }
            for entry in WalkDir::new(&root).follow_links(true) {
                let entry = entry?;
                let path = entry.path();
                let matches = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| extensions.contains(&e));
                if matches && path.is_file() {
                    files.push(path.to_path_buf());
                }
            }
        }
        files.sort();
        debug!(
            "Found {} source file(s) in {}:{}",
            files.len(),
            self.name,
            set.name
        );
        Ok(files)
    }

    /// Conventions applied so far.
    #[must_use]
    pub fn applied_conventions(&self) -> &BTreeSet<String> {
        &self.applied
    }

    /// Returns `true` if the convention `id` was applied.
    #[must_use]
    pub fn has_applied(&self, id: &str) -> bool {
        self.applied.contains(id)
    }

    /// Applies `convention` and everything it composes.
    ///
    /// Returns `false` when the convention had already been applied to this
    /// module, in which case nothing changes.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigurationError`] raised by any convention, or
    /// [`ConfigurationError::ConventionCycle`] if a convention composes itself.
    pub fn apply(
        &mut self,
        convention: &dyn Convention,
        ctx: &BuildContext,
    ) -> Result<bool, ConfigurationError> {
        let id = convention.id();
        if self.applied.contains(id) {
            debug!("Convention '{}' already applied to '{}'", id, self.name);
            return Ok(false);
        }
        if self.applying.iter().any(|a| a == id) {
            return Err(ConfigurationError::ConventionCycle { id: id.to_string() });
        }

        self.applying.push(id.to_string());
        let result = self.apply_inner(convention, ctx);
        self.applying.pop();
        result?;

        self.applied.insert(id.to_string());
        info!("Applied convention '{}' to '{}'", id, self.name);
        Ok(true)
    }

    fn apply_inner(
        &mut self,
        convention: &dyn Convention,
        ctx: &BuildContext,
    ) -> Result<(), ConfigurationError> {
        for sub in convention.composes() {
            self.apply(sub.as_ref(), ctx)?;
        }
        convention.configure(self, ctx)
    }

    /// Analysis tasks that are not in the dependency closure of `gate`.
    #[must_use]
    pub fn orphaned_analysis_tasks(&self, gate: &str) -> Vec<String> {
        let closure = self.tasks.dependency_closure(gate);
        self.tasks
            .names_of_kind(TaskKind::Analysis)
            .into_iter()
            .filter(|t| !closure.contains(t))
            .collect()
    }

    /// Fails if any analysis task is unreachable from `gate`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::OrphanedTask`] naming the first orphan.
    pub fn ensure_gate_complete(&self, gate: &str) -> Result<(), ConfigurationError> {
        match self.orphaned_analysis_tasks(gate).into_iter().next() {
            Some(task) => Err(ConfigurationError::OrphanedTask {
                task,
                gate: gate.to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convention::ConventionBox;
    use crate::graph::TaskGroup;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counting {
        id: &'static str,
        calls: Arc<AtomicUsize>,
        subs: Vec<&'static str>,
    }

    impl Convention for Counting {
        fn id(&self) -> &'static str {
            self.id
        }

        fn composes(&self) -> Vec<ConventionBox> {
            self.subs
                .iter()
                .map(|&id| {
                    Box::new(Counting {
                        id,
                        calls: Arc::clone(&self.calls),
                        subs: Vec::new(),
                    }) as ConventionBox
                })
                .collect()
        }

        fn configure(&self, module: &mut Module, _ctx: &BuildContext) -> Result<(), ConfigurationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            module
                .tasks_mut()
                .register_or_get(self.id)
                .of_kind(TaskKind::Analysis)
                .in_group(TaskGroup::Verification);
            module.tasks_mut().add_dependency(CHECK_TASK, self.id);
            Ok(())
        }
    }

    struct SelfComposing;

    impl Convention for SelfComposing {
        fn id(&self) -> &'static str {
            "loop"
        }

        fn composes(&self) -> Vec<ConventionBox> {
            vec![Box::new(SelfComposing)]
        }

        fn configure(&self, _module: &mut Module, _ctx: &BuildContext) -> Result<(), ConfigurationError> {
            Ok(())
        }
    }

    fn ctx() -> BuildContext {
        BuildContext::builder(".").build()
    }

    #[test]
    fn second_apply_is_a_noop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let conv = Counting {
            id: "base",
            calls: Arc::clone(&calls),
            subs: vec![],
        };
        let mut module = Module::new("app", ".");

        assert!(module.apply(&conv, &ctx()).unwrap());
        assert!(!module.apply(&conv, &ctx()).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(module.tasks().len(), 2);
    }

    #[test]
    fn shared_sub_convention_applies_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let left = Counting {
            id: "left",
            calls: Arc::clone(&calls),
            subs: vec!["base"],
        };
        let right = Counting {
            id: "right",
            calls: Arc::clone(&calls),
            subs: vec!["base"],
        };
        let mut module = Module::new("app", ".");

        module.apply(&left, &ctx()).unwrap();
        module.apply(&right, &ctx()).unwrap();

        // base, left, right
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(module.has_applied("base"));
    }

    #[test]
    fn self_composition_is_a_cycle() {
        let mut module = Module::new("app", ".");
        assert!(matches!(
            module.apply(&SelfComposing, &ctx()),
            Err(ConfigurationError::ConventionCycle { id }) if id == "loop"
        ));
        assert!(!module.has_applied("loop"));
    }

    #[test]
    fn orphaned_analysis_task_is_reported() {
        let mut module = Module::new("app", ".");
        module
            .tasks_mut()
            .register_or_get("detekt")
            .of_kind(TaskKind::Analysis);
        module.tasks_mut().register_or_get(CHECK_TASK);

        assert_eq!(module.orphaned_analysis_tasks(CHECK_TASK), vec!["detekt"]);
        assert!(matches!(
            module.ensure_gate_complete(CHECK_TASK),
            Err(ConfigurationError::OrphanedTask { task, .. }) if task == "detekt"
        ));

        module.tasks_mut().add_dependency(CHECK_TASK, "detekt");
        assert!(module.ensure_gate_complete(CHECK_TASK).is_ok());
    }

    #[test]
    fn source_set_suffix() {
        assert_eq!(SourceSet::conventional("main").task_suffix(), "Main");
        assert_eq!(SourceSet::conventional("integrationTest").task_suffix(), "IntegrationTest");
    }

    #[test]
    fn source_files_filter_by_extension() {
        let tmp = tempfile::TempDir::new().unwrap();
        let java = tmp.path().join("src/main/java/com/example");
        std::fs::create_dir_all(&java).unwrap();
        std::fs::write(java.join("A.java"), "class A {}\n").unwrap();
        std::fs::write(java.join("notes.txt"), "").unwrap();

        let module = Module::new("app", tmp.path());
        let set = SourceSet::conventional("main");
        let files = module.source_files(&set, &["java"]).unwrap();
        assert_eq!(files, vec![java.join("A.java")]);
        assert!(module.source_files(&set, &["kt"]).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn source_files_follow_symlinks() {
        let tmp = tempfile::TempDir::new().unwrap();
        let shared = tmp.path().join("shared");
        std::fs::create_dir_all(shared.join("pkg")).unwrap();
        std::fs::write(shared.join("BadClass.java"), "class BadClass{}\n").unwrap();
        std::fs::write(shared.join("pkg/Linked.java"), "class Linked {}\n").unwrap();
        let java = tmp.path().join("src/main/java");
        std::fs::create_dir_all(&java).unwrap();
        std::os::unix::fs::symlink(shared.join("BadClass.java"), java.join("BadClass.java")).unwrap();
        std::os::unix::fs::symlink(shared.join("pkg"), java.join("pkg")).unwrap();

        let module = Module::new("app", tmp.path());
        let files = module
            .source_files(&SourceSet::conventional("main"), &["java"])
            .unwrap();
        assert_eq!(files, vec![java.join("BadClass.java"), java.join("pkg/Linked.java")]);
    }

    #[cfg(unix)]
    #[test]
    fn source_files_report_symlink_loops() {
        let tmp = tempfile::TempDir::new().unwrap();
        let java = tmp.path().join("src/main/java");
        std::fs::create_dir_all(&java).unwrap();
        std::os::unix::fs::symlink(&java, java.join("loop")).unwrap();

        let module = Module::new("app", tmp.path());
        assert!(module
            .source_files(&SourceSet::conventional("main"), &["java"])
            .is_err());
    }
}
