fn main() {
    println!("Run `cargo test -p update-flow` to execute the end-to-end update scenarios.");
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::future::Future;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use std::pin::Pin;
    use std::sync::Mutex;

    use kobuk_manifest::RemoteManifest;
    use kobuk_process::{ProcessError, ProcessRunner, RunOutput};
    use kobuk_updater::{InstallPaths, InstalledBuild, UpdateOutcome, Updater};

    /// Stands in for both external tools: replays scripted outputs in call
    /// order and, when told to, drops an artifact into staging the way the
    /// download manager would.
    struct FakeTools {
        responses: Mutex<VecDeque<RunOutput>>,
        artifact: Option<(PathBuf, Vec<u8>)>,
        calls: Mutex<Vec<(PathBuf, Vec<String>)>>,
    }

    impl FakeTools {
        fn new(responses: Vec<RunOutput>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                artifact: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn delivering(mut self, path: PathBuf, bytes: Vec<u8>) -> Self {
            self.artifact = Some((path, bytes));
            self
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl ProcessRunner for FakeTools {
        fn run<'a>(
            &'a self,
            program: &'a Path,
            args: &'a [String],
        ) -> Pin<Box<dyn Future<Output = Result<RunOutput, ProcessError>> + Send + 'a>> {
            Box::pin(async move {
                self.calls
                    .lock()
                    .unwrap()
                    .push((program.to_path_buf(), args.to_vec()));
                let response = self
                    .responses
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or(RunOutput {
                        exit_code: 0,
                        stdout: vec![],
                    });
                if response.exit_code == 0 {
                    if let Some((path, bytes)) = &self.artifact {
                        std::fs::write(path, bytes).unwrap();
                    }
                }
                Ok(response)
            })
        }
    }

    fn ok(lines: &[&str]) -> RunOutput {
        RunOutput {
            exit_code: 0,
            stdout: lines.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    fn failed(exit_code: i32) -> RunOutput {
        RunOutput {
            exit_code,
            stdout: vec![],
        }
    }

    const DONE: &str = r#"{"type":"done"}"#;

    /// Builds a release archive the way the publisher would: the game tree
    /// with the server shared library and a map.
    fn build_archive() -> (Vec<u8>, u64) {
        let files: &[(&str, &str)] = &[
            ("readme.txt", "game readme"),
            ("bin/server.so", "server library payload"),
            ("maps/ctf_field.bsp", "map payload"),
        ];
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let mut extract_size = 0u64;
        for (name, contents) in files {
            writer
                .start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
            extract_size += contents.len() as u64;
        }
        let buffer = writer.finish().unwrap();
        (buffer.into_inner(), extract_size)
    }

    fn manifest_json(download_size: u64, extract_size: u64, temp_required: u64) -> String {
        serde_json::json!({
            "latest": "v1.2.1",
            "versions": {
                "v1.2.0": {
                    "fileName": "game-v1.2.0.zip",
                    "downloadUrl": "https://cdn.example.com/game-v1.2.0.zip",
                    "downloadSize": download_size,
                    "extractSize": extract_size,
                    "healUrl": "https://cdn.example.com/heal/v1.2.0",
                    "version": "v1.2.0",
                    "signature": "sig-120"
                },
                "v1.2.1": {
                    "fileName": "game-v1.2.1.zip",
                    "downloadUrl": "https://cdn.example.com/game-v1.2.1.zip",
                    "downloadSize": download_size,
                    "extractSize": extract_size,
                    "healUrl": "https://cdn.example.com/heal/v1.2.1",
                    "version": "v1.2.1",
                    "signature": "sig-121"
                }
            },
            "patches": {
                "v1.2.1": {
                    "url": "https://cdn.example.com/patch-v1.2.1.pwr",
                    "fileName": "patch-v1.2.1.pwr",
                    "tempRequired": temp_required
                }
            }
        })
        .to_string()
    }

    struct Fixture {
        _root: tempfile::TempDir,
        paths: InstallPaths,
    }

    fn fixture() -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let paths = InstallPaths::new(root.path().join("install"), root.path().join("data"));
        Fixture { _root: root, paths }
    }

    #[tokio::test]
    async fn full_install_produces_tree_and_aliases() {
        let fx = fixture();
        let (archive, extract_size) = build_archive();
        let download_size = archive.len() as u64;

        let manifest =
            RemoteManifest::from_json(&manifest_json(download_size, extract_size, 1024)).unwrap();
        let staged = fx.paths.staging_dir().join("game-v1.2.0.zip");
        let tools = FakeTools::new(vec![ok(&[])]).delivering(staged.clone(), archive);

        let updater = Updater::new(manifest, &tools, fx.paths.clone());
        let outcome = updater.update(None, Some("v1.2.0")).await.unwrap();
        assert_eq!(outcome, UpdateOutcome::Installed);

        // Final tree matches the archive contents.
        let install = fx.paths.install_dir();
        assert_eq!(
            std::fs::read_to_string(install.join("readme.txt")).unwrap(),
            "game readme"
        );
        assert_eq!(
            std::fs::read_to_string(install.join("bin/server.so")).unwrap(),
            "server library payload"
        );
        assert!(install.join("maps/ctf_field.bsp").exists());

        // The loader alias exists and resolves to the shipped library.
        assert_eq!(
            std::fs::read_to_string(install.join("bin/server_srv.so")).unwrap(),
            "server library payload"
        );

        // The staged archive was cleaned up after a successful apply.
        assert!(!staged.exists());
    }

    #[tokio::test]
    async fn insufficient_staging_space_halts_before_any_subprocess() {
        let fx = fixture();
        let manifest =
            RemoteManifest::from_json(&manifest_json(1024, 2048, u64::MAX)).unwrap();
        std::fs::create_dir_all(fx.paths.install_dir().join("bin")).unwrap();
        std::fs::write(fx.paths.install_dir().join("bin/server.so"), "elf").unwrap();
        let installed = InstalledBuild {
            version: "v1.2.0".to_owned(),
            signature: "sig-120".to_owned(),
        };

        let tools = FakeTools::new(vec![]);
        let updater = Updater::new(manifest, &tools, fx.paths.clone());

        let err = updater
            .update(Some(&installed), Some("v1.2.1"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), 1);
        assert_eq!(tools.call_count(), 0);
    }

    #[tokio::test]
    async fn download_failure_never_reaches_apply() {
        let fx = fixture();
        let manifest = RemoteManifest::from_json(&manifest_json(1024, 2048, 64)).unwrap();

        let tools = FakeTools::new(vec![failed(3)]);
        let updater = Updater::new(manifest, &tools, fx.paths.clone());

        let err = updater.update(None, Some("v1.2.0")).await.unwrap_err();
        assert_eq!(err.code(), 2);

        // Only the download tool ran, and the install tree was never touched.
        assert_eq!(tools.call_count(), 1);
        let calls = tools.calls.lock().unwrap();
        assert_eq!(calls[0].0, fx.paths.download_tool());
        assert!(!fx.paths.install_dir().exists());
    }

    #[tokio::test]
    async fn incremental_patch_end_to_end() {
        let fx = fixture();
        let manifest = RemoteManifest::from_json(&manifest_json(1024, 2048, 64)).unwrap();
        std::fs::create_dir_all(fx.paths.install_dir().join("bin")).unwrap();
        std::fs::write(fx.paths.install_dir().join("bin/server.so"), "elf").unwrap();
        let installed = InstalledBuild {
            version: "v1.2.0".to_owned(),
            signature: "sig-120".to_owned(),
        };

        let tools = FakeTools::new(vec![
            ok(&[DONE]),
            ok(&[r#"{"type":"progress","value":0.5}"#, DONE]),
        ]);
        let updater = Updater::new(manifest, &tools, fx.paths.clone());

        let outcome = updater.update(Some(&installed), None).await.unwrap();
        assert_eq!(outcome, UpdateOutcome::Patched);

        let calls = tools.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, fx.paths.patch_tool());
        assert_eq!(calls[0].1[0], "verify");
        assert_eq!(calls[1].1[0], "patch");
        assert!(fx.paths.install_dir().join("bin/server_srv.so").exists());
    }
}
