#![cfg(unix)]

mod support;

use std::sync::{Arc, Mutex};

use support::ScriptedFs;
use walk::{
    CancellationToken, EntryKind, SortMode, WalkBuilder, WalkEntry, WalkError, WalkErrorKind,
    WalkOptions, Walker, traverse_with,
};

fn collect(walker: Walker<&ScriptedFs>) -> Vec<Result<String, WalkError>> {
    walker
        .map(|entry| entry.map(|entry| entry.relative_str()))
        .collect()
}

fn paths(walker: Walker<&ScriptedFs>) -> Vec<String> {
    walker
        .map(|entry| entry.expect("entry").relative_str())
        .collect()
}

#[test]
fn denied_directory_is_skipped_under_suppression() {
    let fs = ScriptedFs::tree("/r", &["a.txt", "locked/b.txt", "z.txt"])
        .deny_read("/r/locked", libc::EACCES);
    let mut walker = WalkBuilder::new("/r").build_with(&fs).expect("walker");
    let seen: Vec<String> = walker
        .by_ref()
        .map(|entry| entry.expect("entry").relative_str())
        .collect();
    assert_eq!(seen, ["a.txt", "z.txt"]);
    assert_eq!(walker.summary().errors_suppressed, 1);
}

#[test]
fn denied_directory_stops_traversal_without_suppression() {
    let fs = ScriptedFs::tree("/r", &["a.txt", "locked/b.txt", "z.txt"])
        .deny_read("/r/locked", libc::EPERM);
    let mut walker = WalkBuilder::new("/r")
        .suppress_errors(false)
        .build_with(&fs)
        .expect("walker");

    assert_eq!(walker.next().expect("a").expect("ok").relative_str(), "a.txt");
    assert_eq!(fs.open_handles(), 1);
    let error = walker.next().expect("error").expect_err("denied");
    assert_eq!(error.kind(), WalkErrorKind::PermissionDenied);
    assert_eq!(error.path(), std::path::Path::new("/r/locked"));
    assert_eq!(error.raw_os_error(), Some(libc::EPERM));
    assert!(walker.next().is_none());
    assert_eq!(walker.open_handles(), 0);
    assert_eq!(fs.open_handles(), 0);
}

#[test]
fn vanished_directory_is_never_suppressed() {
    let fs = ScriptedFs::tree("/r", &["gone/x.txt"]).deny_read("/r/gone", libc::ENOENT);
    let results = collect(WalkBuilder::new("/r").build_with(&fs).expect("walker"));
    assert_eq!(results.len(), 1);
    let error = results[0].as_ref().expect_err("not found");
    assert_eq!(error.kind(), WalkErrorKind::NotFound);
}

#[test]
fn mid_stream_failure_ends_the_walk() {
    let fs = ScriptedFs::tree("/r", &["big/f1", "big/f2", "big/f3", "z.txt"])
        .fail_stream("/r/big", 2, libc::EIO);
    let mut walker = WalkBuilder::new("/r").build_with(&fs).expect("walker");

    assert_eq!(walker.next().expect("1").expect("ok").relative_str(), "big/f1");
    assert_eq!(walker.next().expect("2").expect("ok").relative_str(), "big/f2");
    let error = walker.next().expect("3").expect_err("io failure");
    assert_eq!(error.kind(), WalkErrorKind::Unknown);
    assert_eq!(error.path(), std::path::Path::new("/r/big"));
    assert!(walker.next().is_none());
    assert_eq!(fs.open_handles(), 0);
}

#[test]
fn suppressed_mid_stream_failure_resumes_with_parent() {
    let fs = ScriptedFs::tree("/r", &["big/f1", "big/f2", "big/f3", "z.txt"])
        .fail_stream("/r/big", 2, libc::EACCES);
    let walker = WalkBuilder::new("/r").build_with(&fs).expect("walker");
    assert_eq!(paths(walker), ["big/f1", "big/f2", "z.txt"]);
    assert_eq!(fs.open_handles(), 0);
}

#[test]
fn buffered_failure_skips_the_whole_directory() {
    let fs = ScriptedFs::tree("/r", &["big/f1", "big/f2", "big/f3", "z.txt"])
        .fail_stream("/r/big", 2, libc::EACCES);
    let walker = WalkBuilder::new("/r")
        .sort(SortMode::Ascending)
        .build_with(&fs)
        .expect("walker");
    assert_eq!(paths(walker), ["z.txt"]);
}

#[test]
fn canonicalize_failure_skips_descent() {
    let fs = ScriptedFs::tree("/r", &["a.txt", "sub/b.txt"])
        .fail_canonicalize("/r/sub", libc::EACCES);

    let mut walker = WalkBuilder::new("/r")
        .follow_symlinks(true)
        .sort(SortMode::Ascending)
        .build_with(&fs)
        .expect("walker");
    let seen: Vec<String> = walker
        .by_ref()
        .map(|entry| entry.expect("entry").relative_str())
        .collect();
    assert_eq!(seen, ["a.txt"]);
    assert_eq!(walker.summary().errors_suppressed, 1);
    assert!(!fs.log().contains(&"read_dir /r/sub".to_owned()));

    let strict = WalkBuilder::new("/r")
        .follow_symlinks(true)
        .suppress_errors(false)
        .sort(SortMode::Ascending)
        .build_with(&fs)
        .expect("walker");
    let results = collect(strict);
    assert_eq!(results.len(), 2);
    assert_eq!(
        results[1].as_ref().expect_err("denied").kind(),
        WalkErrorKind::PermissionDenied
    );
}

#[test]
fn ancestor_link_is_entered_once() {
    let fs = ScriptedFs::tree("/r", &["a.txt", "sub/b.txt"]).link("/r/sub/up", "/r");
    let mut walker = WalkBuilder::new("/r")
        .follow_symlinks(true)
        .sort(SortMode::Ascending)
        .build_with(&fs)
        .expect("walker");
    let seen: Vec<String> = walker
        .by_ref()
        .map(|entry| entry.expect("entry").relative_str())
        .collect();
    assert_eq!(seen, ["a.txt", "sub/b.txt"]);
    assert_eq!(walker.summary().cycles_skipped, 1);
    assert!(!fs.log().contains(&"read_dir /r/sub/up".to_owned()));
}

#[test]
fn relative_link_cycle_is_detected() {
    let fs = ScriptedFs::tree("/r", &["deep/er/leaf.txt"]).link("/r/deep/er/back", "../..");
    let walker = WalkBuilder::new("/r")
        .follow_symlinks(true)
        .build_with(&fs)
        .expect("walker");
    assert_eq!(paths(walker), ["deep/er/leaf.txt"]);
}

#[test]
fn mutual_links_report_symlink_loop() {
    let fs = ScriptedFs::new().dir("/r").link("/r/a", "/r/b").link("/r/b", "/r/a");

    let error = WalkBuilder::new("/r")
        .follow_symlinks(true)
        .build_with(&fs)
        .expect("walker")
        .find_map(Result::err)
        .expect("loop");
    assert_eq!(error.kind(), WalkErrorKind::SymlinkLoop);

    let unfollowed = WalkBuilder::new("/r").build_with(&fs).expect("walker");
    assert_eq!(paths(unfollowed), ["a", "b"]);
}

#[test]
fn dangling_link_is_yielded_as_symlink() {
    let fs = ScriptedFs::new().dir("/r").link("/r/broken", "/nowhere");
    let entries: Vec<WalkEntry> = WalkBuilder::new("/r")
        .follow_symlinks(true)
        .build_with(&fs)
        .expect("walker")
        .map(|entry| entry.expect("entry"))
        .collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind(), EntryKind::Symlink);
    assert!(entries[0].is_symlink());
}

#[test]
fn dangling_link_with_stats_describes_the_link() {
    let fs = ScriptedFs::new()
        .file("/r/real.txt", 4)
        .link("/r/broken", "/nowhere");
    let names: Vec<(String, EntryKind, Option<EntryKind>)> = WalkBuilder::new("/r")
        .follow_symlinks(true)
        .with_stats(true)
        .sort(SortMode::Ascending)
        .suppress_errors(false)
        .build_with(&fs)
        .expect("walker")
        .map(|entry| {
            let entry = entry.expect("entry");
            let stats_kind = entry.stats().map(|stats| stats.kind);
            (entry.relative_str(), entry.kind(), stats_kind)
        })
        .collect();
    assert_eq!(
        names,
        vec![
            ("broken".to_owned(), EntryKind::Symlink, Some(EntryKind::Symlink)),
            ("real.txt".to_owned(), EntryKind::File, Some(EntryKind::File)),
        ]
    );
}

#[test]
fn stat_failure_follows_suppression_policy() {
    let fs = ScriptedFs::new()
        .file("/r/a.txt", 3)
        .file("/r/b.txt", 7)
        .fail_stat("/r/a.txt", libc::EACCES);

    let mut walker = WalkBuilder::new("/r")
        .with_stats(true)
        .build_with(&fs)
        .expect("walker");
    let entries: Vec<WalkEntry> = walker
        .by_ref()
        .map(|entry| entry.expect("entry"))
        .collect();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].stats().is_none());
    assert_eq!(entries[1].stats().map(|stats| stats.len), Some(7));
    assert_eq!(walker.summary().errors_suppressed, 1);

    let strict = WalkBuilder::new("/r")
        .with_stats(true)
        .suppress_errors(false)
        .build_with(&fs)
        .expect("walker");
    let results = collect(strict);
    assert_eq!(results.len(), 1);
    assert!(results[0].is_err());
}

#[test]
fn pre_cancelled_walk_never_reads() {
    let fs = ScriptedFs::tree("/r", &["a.txt"]);
    let token = CancellationToken::new();
    token.cancel();

    let results = collect(
        WalkBuilder::new("/r")
            .cancellation_token(token)
            .suppress_errors(false)
            .build_with(&fs)
            .expect("walker"),
    );
    assert_eq!(results.len(), 1);
    let error = results[0].as_ref().expect_err("aborted");
    assert_eq!(error.kind(), WalkErrorKind::Aborted);
    assert_eq!(fs.reads(), 0);
}

#[test]
fn cancelling_from_progress_releases_handles() {
    let fs = ScriptedFs::tree("/r", &["a/1", "a/2", "a/3", "b/4", "b/5"]);
    let token = CancellationToken::new();
    let trigger = token.clone();

    let mut walker = WalkBuilder::new("/r")
        .cancellation_token(token)
        .on_progress(move |_| trigger.cancel())
        .build_with(&fs)
        .expect("walker");
    let seen: Vec<String> = walker
        .by_ref()
        .map(|entry| entry.expect("entry").relative_str())
        .collect();
    assert_eq!(seen, ["a/1"]);
    assert_eq!(walker.open_handles(), 0);
    assert_eq!(fs.open_handles(), 0);
}

#[test]
fn comparator_sees_unfollowed_records() {
    let fs = ScriptedFs::tree("/r", &["dir/", "file"]).link("/r/link", "/r/dir");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);

    let walker = WalkBuilder::new("/r")
        .follow_symlinks(true)
        .yield_directories(true)
        .sort_by(move |a, b| {
            let mut seen = recorder.lock().expect("lock");
            seen.push((a.name.to_string_lossy().into_owned(), a.kind));
            seen.push((b.name.to_string_lossy().into_owned(), b.kind));
            b.name.cmp(&a.name)
        })
        .build_with(&fs)
        .expect("walker");
    let yielded = paths(walker);

    assert_eq!(yielded, ["link", "file", "dir"]);
    let seen = seen.lock().expect("lock");
    assert!(seen.contains(&("link".to_owned(), EntryKind::Symlink)));
    assert!(seen.contains(&("dir".to_owned(), EntryKind::Directory)));
}

#[test]
fn json_options_drive_a_scripted_walk() {
    let fs = ScriptedFs::tree("/r", &["a.txt", "b.md", "d/c.txt"]);
    let options = WalkOptions::from_json_str(
        r#"{ "maxDepth": 0, "sort": "desc", "yieldDirectories": true, "exclude": "md" }"#,
    )
    .expect("options");
    let config = options.sanitize().expect("config");

    assert_eq!(paths(traverse_with(&fs, "/r", config)), ["d", "a.txt"]);
}
