use std::{path::Path, sync::Arc};

use balafon::{
  plugins, BalafonOptions, Command, OutputBundle, OutputFile, OutputOptions, ResolvedConfig,
  TemplateTransform,
};
use balafon_test_utils::{FakeRunner, FakeTransform, PluginDriver, TestHost};
use tempfile::TempDir;

pub struct Fixture {
  pub dir: TempDir,
  pub runner: Arc<FakeRunner>,
  pub driver: PluginDriver,
  pub host: TestHost,
}

#[derive(Debug, Clone, Copy)]
pub enum Mode {
  Dev,
  DevSsr,
  Prod,
  ProdSsr,
}

impl Fixture {
  pub async fn new(mode: Mode, options: BalafonOptions, runner: FakeRunner) -> Self {
    Self::with_transforms(mode, options, runner, vec![Arc::new(FakeTransform::default())]).await
  }

  pub async fn with_transforms(
    mode: Mode,
    options: BalafonOptions,
    runner: FakeRunner,
    transforms: Vec<Arc<dyn TemplateTransform>>,
  ) -> Self {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(runner);
    let driver = PluginDriver::new(plugins(options, runner.clone()).unwrap());
    let (is_production, ssr) = match mode {
      Mode::Dev => (false, false),
      Mode::DevSsr => (false, true),
      Mode::Prod => (true, false),
      Mode::ProdSsr => (true, true),
    };
    driver
      .config_resolved(&ResolvedConfig {
        root: dir.path().to_path_buf(),
        command: if is_production {
          Command::Build
        } else {
          Command::Serve
        },
        is_production,
        ssr,
        out_dir: dir.path().join("dist"),
        transforms,
      })
      .await
      .unwrap();
    Self {
      dir,
      runner,
      driver,
      host: TestHost::default(),
    }
  }

  pub fn write(&self, relative: &str, content: &str) -> std::path::PathBuf {
    let path = self.dir.path().join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    path
  }

  pub async fn resolve(&mut self, specifier: &str) -> Option<String> {
    self.driver.resolve_id(&mut self.host, specifier).await.unwrap()
  }

  pub async fn load(&mut self, specifier: &str) -> balafon::BuildResult<String> {
    let id = self.resolve(specifier).await.expect("virtual specifier");
    let source = self.driver.load(&mut self.host, &id).await?;
    Ok(source.expect("loaded").code)
  }

  pub async fn build(&mut self, entries: &[(&str, &str)]) -> OutputBundle {
    self
      .host
      .build(&self.driver, entries, &OutputOptions::default())
      .await
      .unwrap()
  }

  pub async fn hot_update(&mut self, path: &Path) -> bool {
    self
      .driver
      .handle_hot_update(&mut self.host, path)
      .await
      .unwrap()
  }
}

pub fn code_of<'a>(bundle: &'a OutputBundle, file_name: &str) -> &'a str {
  match bundle.get(file_name) {
    Some(OutputFile::Chunk(chunk)) => chunk.code.trim_end(),
    Some(OutputFile::Asset(asset)) => asset.source.trim_end(),
    None => panic!("{file_name} is not in the bundle"),
  }
}

pub fn output_friendly_to_snapshot(bundle: &OutputBundle) -> String {
  let mut files = bundle.files.iter().collect::<Vec<_>>();
  files.sort_by_key(|file| file.file_name().to_string());
  files
    .iter()
    .flat_map(|file| {
      [
        format!("---------- {} ----------", file.file_name()),
        code_of(bundle, file.file_name()).to_string(),
      ]
    })
    .collect::<Vec<_>>()
    .join("\n")
}
