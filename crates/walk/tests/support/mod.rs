//! In-memory filesystem with scripted faults for walker integration tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;
use std::vec;

use walk::{DirRecord, EntryKind, EntryStats, FileSystem};

const MAX_HOPS: usize = 40;

#[derive(Clone, Debug)]
enum Node {
    Dir,
    File(u64),
    Link(PathBuf),
}

impl Node {
    fn kind(&self) -> EntryKind {
        match self {
            Self::Dir => EntryKind::Directory,
            Self::File(_) => EntryKind::File,
            Self::Link(_) => EntryKind::Symlink,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
enum Op {
    ReadDir,
    Canonicalize,
    Stat,
}

/// Scripted filesystem. Paths are absolute and `/`-separated.
///
/// `FileSystem` is implemented for `&ScriptedFs`, so a test keeps ownership
/// and can inspect handle counts after the walker is done.
#[derive(Debug, Default)]
pub struct ScriptedFs {
    nodes: BTreeMap<PathBuf, Node>,
    faults: HashMap<(Op, PathBuf), i32>,
    stream_faults: HashMap<PathBuf, (usize, i32)>,
    open: Rc<Cell<usize>>,
    reads: Cell<usize>,
    log: RefCell<Vec<String>>,
}

pub fn errno(code: i32) -> io::Error {
    io::Error::from_raw_os_error(code)
}

impl ScriptedFs {
    pub fn new() -> Self {
        let mut fs = Self::default();
        fs.nodes.insert(PathBuf::from("/"), Node::Dir);
        fs
    }

    /// Builds a tree from `/`-relative paths under `root`; a trailing `/`
    /// marks a directory.
    pub fn tree(root: &str, paths: &[&str]) -> Self {
        let mut fs = Self::new().dir(root);
        for path in paths {
            let full = format!("{root}/{path}");
            fs = match full.strip_suffix('/') {
                Some(dir) => fs.dir(dir),
                None => fs.file(&full, 1),
            };
        }
        fs
    }

    pub fn dir(mut self, path: &str) -> Self {
        self.insert(Path::new(path), Node::Dir);
        self
    }

    pub fn file(mut self, path: &str, len: u64) -> Self {
        self.insert(Path::new(path), Node::File(len));
        self
    }

    pub fn link(mut self, path: &str, target: &str) -> Self {
        self.insert(Path::new(path), Node::Link(PathBuf::from(target)));
        self
    }

    /// Makes `read_dir(path)` fail with `code`.
    pub fn deny_read(mut self, path: &str, code: i32) -> Self {
        self.faults.insert((Op::ReadDir, PathBuf::from(path)), code);
        self
    }

    /// Makes the stream for `path` fail with `code` after `after` records.
    pub fn fail_stream(mut self, path: &str, after: usize, code: i32) -> Self {
        self.stream_faults.insert(PathBuf::from(path), (after, code));
        self
    }

    pub fn fail_canonicalize(mut self, path: &str, code: i32) -> Self {
        self.faults.insert((Op::Canonicalize, PathBuf::from(path)), code);
        self
    }

    pub fn fail_stat(mut self, path: &str, code: i32) -> Self {
        self.faults.insert((Op::Stat, PathBuf::from(path)), code);
        self
    }

    /// Directory streams currently open.
    pub fn open_handles(&self) -> usize {
        self.open.get()
    }

    /// Number of `read_dir` calls that succeeded.
    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    /// Operations performed, in order, as `op path` strings.
    pub fn log(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    fn insert(&mut self, path: &Path, node: Node) {
        let mut parent = path.parent();
        while let Some(dir) = parent {
            self.nodes.entry(dir.to_path_buf()).or_insert(Node::Dir);
            parent = dir.parent();
        }
        self.nodes.insert(path.to_path_buf(), node);
    }

    fn fault(&self, op: Op, path: &Path) -> io::Result<()> {
        match self.faults.get(&(op, path.to_path_buf())) {
            Some(code) => Err(errno(*code)),
            None => Ok(()),
        }
    }

    /// Resolves every symlink in `path`, including the final component.
    fn resolve(&self, path: &Path) -> io::Result<PathBuf> {
        let mut resolved = PathBuf::from("/");
        let mut queue: VecDeque<OsString> = parts(path).collect();
        let mut hops = 0;
        while let Some(part) = queue.pop_front() {
            if part == ".." {
                resolved.pop();
                continue;
            }
            let candidate = resolved.join(&part);
            match self.nodes.get(&candidate) {
                None => return Err(errno(libc::ENOENT)),
                Some(Node::Link(target)) => {
                    hops += 1;
                    if hops > MAX_HOPS {
                        return Err(errno(libc::ELOOP));
                    }
                    if target.is_absolute() {
                        resolved = PathBuf::from("/");
                    }
                    for (index, segment) in parts(target).enumerate() {
                        queue.insert(index, segment);
                    }
                }
                Some(_) => resolved = candidate,
            }
        }
        Ok(resolved)
    }

    fn lookup(&self, path: &Path, follow: bool) -> io::Result<&Node> {
        let located = if follow {
            self.resolve(path)?
        } else {
            let parent = path.parent().unwrap_or_else(|| Path::new("/"));
            let name = path.file_name().ok_or_else(|| errno(libc::ENOENT))?;
            self.resolve(parent)?.join(name)
        };
        self.nodes.get(&located).ok_or_else(|| errno(libc::ENOENT))
    }
}

fn parts(path: &Path) -> impl Iterator<Item = OsString> + '_ {
    path.components().filter_map(|component| match component {
        Component::Normal(name) => Some(name.to_os_string()),
        Component::ParentDir => Some(OsString::from("..")),
        _ => None,
    })
}

/// Stream over a scripted directory; tracks how many are open.
#[derive(Debug)]
pub struct ScriptedReadDir {
    records: vec::IntoIter<DirRecord>,
    fail: Option<(usize, i32)>,
    produced: usize,
    open: Rc<Cell<usize>>,
}

impl Iterator for ScriptedReadDir {
    type Item = io::Result<DirRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((after, code)) = self.fail {
            if self.produced == after {
                self.fail = None;
                return Some(Err(errno(code)));
            }
        }
        let record = self.records.next()?;
        self.produced += 1;
        Some(Ok(record))
    }
}

impl Drop for ScriptedReadDir {
    fn drop(&mut self) {
        self.open.set(self.open.get() - 1);
    }
}

impl FileSystem for &ScriptedFs {
    type ReadDir = ScriptedReadDir;

    fn read_dir(&self, path: &Path) -> io::Result<Self::ReadDir> {
        self.log.borrow_mut().push(format!("read_dir {}", path.display()));
        self.fault(Op::ReadDir, path)?;
        let resolved = self.resolve(path)?;
        if !matches!(self.nodes.get(&resolved), Some(Node::Dir)) {
            return Err(errno(libc::ENOTDIR));
        }
        let records: Vec<DirRecord> = self
            .nodes
            .iter()
            .filter(|(candidate, _)| candidate.parent() == Some(resolved.as_path()))
            .filter_map(|(candidate, node)| {
                candidate
                    .file_name()
                    .map(|name| DirRecord::new(name, node.kind()))
            })
            .collect();
        self.reads.set(self.reads.get() + 1);
        self.open.set(self.open.get() + 1);
        Ok(ScriptedReadDir {
            records: records.into_iter(),
            fail: self.stream_faults.get(path).copied(),
            produced: 0,
            open: Rc::clone(&self.open),
        })
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        self.log.borrow_mut().push(format!("canonicalize {}", path.display()));
        self.fault(Op::Canonicalize, path)?;
        self.resolve(path)
    }

    fn metadata(&self, path: &Path, follow: bool) -> io::Result<EntryStats> {
        self.log.borrow_mut().push(format!("stat {}", path.display()));
        self.fault(Op::Stat, path)?;
        let node = self.lookup(path, follow)?;
        let len = match node {
            Node::File(len) => *len,
            _ => 0,
        };
        Ok(EntryStats {
            kind: node.kind(),
            len,
            modified: None,
            accessed: None,
            created: None,
            readonly: false,
            mode: None,
        })
    }
}
