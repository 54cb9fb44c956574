use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::TempDir;

use drive_retitle::contract::{ItemPage, RemoteItem, RemoteStore, StoreError};
use drive_retitle::transform::{
    retitle_args, title_for, Retitler, AUDIO_STREAM_SLOTS, SUBTITLE_STREAM_SLOTS,
    VIDEO_STREAM_SLOTS,
};
use drive_retitle::workspace::Workspace;

/// Serves fixed bytes for download; the other operations are unused here.
struct ByteStore {
    files: HashMap<String, Vec<u8>>,
}

impl ByteStore {
    fn with_file(name: &str, content: &[u8]) -> Self {
        let mut files = HashMap::new();
        files.insert(name.to_string(), content.to_vec());
        Self { files }
    }
}

#[async_trait]
impl RemoteStore for ByteStore {
    async fn list_page(
        &self,
        _folder_id: &str,
        _page_token: Option<String>,
    ) -> Result<ItemPage, StoreError> {
        Ok(ItemPage::default())
    }

    async fn download_to(&self, item: &RemoteItem, dest: &Path) -> Result<(), StoreError> {
        let bytes = self
            .files
            .get(&item.name)
            .ok_or_else(|| format!("no such file {}", item.name))?;
        fs::write(dest, bytes)?;
        Ok(())
    }

    async fn upload(&self, _folder_id: &str, _local: &Path) -> Result<(), StoreError> {
        Err("not used in this test".into())
    }
}

fn write_tool(dir: &Path, script: &str) -> PathBuf {
    let path = dir.join("fake-ffmpeg");
    fs::write(&path, script).expect("write stub tool");
    let mut perms = fs::metadata(&path).expect("tool metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod stub tool");
    path
}

fn test_workspace(dir: &Path) -> Workspace {
    let workspace = Workspace::new(dir.join("Download"), dir.join("MetaUpdate"));
    workspace.ensure().expect("ensure scratch dirs");
    workspace
}

/// The title is the file name with its final extension removed.
#[test]
fn title_for_strips_final_extension_only() {
    assert_eq!(title_for("Some.Movie.2019.mkv"), "Some.Movie.2019");
    assert_eq!(title_for("clip.mp4"), "clip");
    assert_eq!(title_for("no_extension"), "no_extension");
    assert_eq!(title_for(".hidden"), ".hidden");
}

/// The argument list stream-copies all streams and stamps the container
/// title before the per-stream battery.
#[test]
fn retitle_args_requests_full_stream_copy() {
    let args = retitle_args(
        Path::new("/tmp/raw/in.mkv"),
        Path::new("/tmp/staged/in.mkv"),
        "in",
    );

    let expect_prefix: Vec<OsString> = [
        "-i",
        "/tmp/raw/in.mkv",
        "-map",
        "0",
        "-c",
        "copy",
        "-metadata",
        "title=in",
    ]
    .iter()
    .map(OsString::from)
    .collect();
    assert_eq!(&args[..expect_prefix.len()], &expect_prefix[..]);
    assert_eq!(args.last(), Some(&OsString::from("/tmp/staged/in.mkv")));
}

/// Every slot of the fixed battery is addressed once, with the same title
/// value throughout.
#[test]
fn retitle_args_covers_every_battery_slot() {
    let title = "Some.Movie.2019";
    let args = retitle_args(Path::new("in.mkv"), Path::new("out.mkv"), title);

    let as_strings: Vec<String> = args
        .iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();

    for index in 0..AUDIO_STREAM_SLOTS {
        assert!(as_strings.contains(&format!("-metadata:s:a:{index}")));
    }
    for index in 0..VIDEO_STREAM_SLOTS {
        assert!(as_strings.contains(&format!("-metadata:s:v:{index}")));
    }
    for index in 0..SUBTITLE_STREAM_SLOTS {
        assert!(as_strings.contains(&format!("-metadata:s:s:{index}")));
    }

    // One container title plus one value per battery slot.
    let title_values = as_strings
        .iter()
        .filter(|a| *a == &format!("title={title}"))
        .count();
    let expected_slots =
        (1 + AUDIO_STREAM_SLOTS + VIDEO_STREAM_SLOTS + SUBTITLE_STREAM_SLOTS) as usize;
    assert_eq!(title_values, expected_slots);
}

/// A successful rewrite leaves the artifact in staging and removes the raw
/// download.
#[tokio::test]
async fn process_writes_artifact_and_removes_raw_download() {
    let dir = TempDir::new().expect("tempdir");
    let workspace = test_workspace(dir.path());
    let argfile = dir.path().join("recorded-args.txt");
    let tool = write_tool(
        dir.path(),
        &format!(
            "#!/bin/sh\n\
             printf '%s\\n' \"$@\" > \"{}\"\n\
             input=\"\"\n\
             prev=\"\"\n\
             last=\"\"\n\
             for arg in \"$@\"; do\n\
             \tif [ \"$prev\" = \"-i\" ]; then input=\"$arg\"; fi\n\
             \tprev=\"$arg\"\n\
             \tlast=\"$arg\"\n\
             done\n\
             cp \"$input\" \"$last\"\n",
            argfile.display()
        ),
    );

    let store = ByteStore::with_file("Some.Movie.2019.mkv", b"raw bytes");
    let item = RemoteItem::new("id-1", "Some.Movie.2019.mkv");

    let artifact = Retitler::new(&tool)
        .process(&store, &item, &workspace)
        .await
        .expect("process");

    assert_eq!(artifact, workspace.staging_dir.join("Some.Movie.2019.mkv"));
    assert_eq!(fs::read(&artifact).expect("artifact"), b"raw bytes");
    assert!(
        !workspace.download_dir.join("Some.Movie.2019.mkv").exists(),
        "raw download must be removed after a successful rewrite"
    );

    // The tool saw the full battery with the derived title.
    let recorded = fs::read_to_string(&argfile).expect("recorded args");
    let lines: Vec<&str> = recorded.lines().collect();
    assert!(lines.contains(&"-metadata:s:a:10"));
    assert!(lines.contains(&"-metadata:s:v:0"));
    assert!(lines.contains(&"-metadata:s:s:40"));
    assert!(lines.contains(&"title=Some.Movie.2019"));
    assert_eq!(
        lines.last().copied(),
        Some(artifact.to_string_lossy().as_ref())
    );
}

/// A failing tool surfaces as a transform error and leaves the raw file in
/// place for the caller's purge.
#[tokio::test]
async fn process_maps_tool_failure_to_transform_error() {
    let dir = TempDir::new().expect("tempdir");
    let workspace = test_workspace(dir.path());
    let tool = write_tool(dir.path(), "#!/bin/sh\nexit 1\n");

    let store = ByteStore::with_file("broken.mkv", b"raw");
    let item = RemoteItem::new("id-1", "broken.mkv");

    let err = Retitler::new(&tool)
        .process(&store, &item, &workspace)
        .await
        .unwrap_err();

    assert!(
        matches!(err, drive_retitle::error::PipelineError::Transform { ref name, .. } if name == "broken.mkv"),
        "expected transform error, got: {err}"
    );
    assert!(workspace.download_dir.join("broken.mkv").exists());
}

/// A tool that cannot even be launched also counts as a transform failure.
#[tokio::test]
async fn process_maps_missing_tool_to_transform_error() {
    let dir = TempDir::new().expect("tempdir");
    let workspace = test_workspace(dir.path());

    let store = ByteStore::with_file("a.mkv", b"raw");
    let item = RemoteItem::new("id-1", "a.mkv");

    let err = Retitler::new(dir.path().join("no-such-tool"))
        .process(&store, &item, &workspace)
        .await
        .unwrap_err();

    assert!(
        matches!(err, drive_retitle::error::PipelineError::Transform { .. }),
        "expected transform error, got: {err}"
    );
}

/// A download failure never reaches the tool.
#[tokio::test]
async fn process_maps_download_failure_to_download_error() {
    let dir = TempDir::new().expect("tempdir");
    let workspace = test_workspace(dir.path());
    let tool = write_tool(dir.path(), "#!/bin/sh\nexit 0\n");

    let store = ByteStore {
        files: HashMap::new(),
    };
    let item = RemoteItem::new("id-1", "absent.mkv");

    let err = Retitler::new(&tool)
        .process(&store, &item, &workspace)
        .await
        .unwrap_err();

    assert!(
        matches!(err, drive_retitle::error::PipelineError::Download { ref name, .. } if name == "absent.mkv"),
        "expected download error, got: {err}"
    );
}
