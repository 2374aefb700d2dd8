mod common;

use balafon::{names::command, AssetOptions, BalafonOptions, ModuleFormat, OutputOptions};
use balafon_test_utils::FakeRunner;
use common::{code_of, output_friendly_to_snapshot, Fixture, Mode};

fn i18n_options() -> BalafonOptions {
  BalafonOptions {
    i18n_root: Some("i18n".into()),
    ..Default::default()
  }
}

#[tokio::test]
async fn core_script_is_deferred_to_its_own_chunk() {
  let runner = FakeRunner::new()
    .respond(command::ENV, "{}")
    .respond(command::CORE_SCRIPT, "window.core = 1;");
  let mut fixture = Fixture::new(Mode::Prod, Default::default(), runner).await;

  let mut bundle = fixture.build(&[("index.js", "virtual:balafon/core.js")]).await;
  assert_eq!(
    code_of(&bundle, "index.js"),
    r#"export default (await import(new URL("./balafon/core.js", import.meta.url).href)).default;"#
  );
  assert!(code_of(&bundle, "balafon/core.js").contains(r#"(0, eval)("window.core = 1;")"#));
  assert_eq!(fixture.host.chunks.len(), 1);
  assert_eq!(
    fixture.host.chunks[0].1.preserve_signature,
    balafon_plugin::PreserveSignature::Strict
  );

  let before = output_friendly_to_snapshot(&bundle);
  fixture
    .driver
    .generate_bundle(&mut fixture.host, &OutputOptions::default(), &mut bundle)
    .await
    .unwrap();
  assert_eq!(output_friendly_to_snapshot(&bundle), before);
}

#[tokio::test]
async fn core_script_is_memoized_for_the_build() {
  let runner = FakeRunner::new()
    .respond(command::ENV, "{}")
    .respond(command::CORE_SCRIPT, "window.core = 1;");
  let mut fixture = Fixture::new(Mode::Prod, Default::default(), runner).await;
  let first = fixture.load("virtual:balafon/core.js").await.unwrap();
  let second = fixture.load("virtual:balafon/core.js").await.unwrap();
  assert_eq!(first, second);
  assert_eq!(fixture.runner.call_count(command::CORE_SCRIPT), 1);
  assert_eq!(fixture.host.chunks.len(), 1);
}

#[tokio::test]
async fn missing_core_script_fails_the_build() {
  let runner = FakeRunner::new()
    .respond(command::ENV, "{}")
    .fail(command::CORE_SCRIPT, "exit status: 1");
  let mut fixture = Fixture::new(Mode::Prod, Default::default(), runner).await;
  let err = fixture.load("virtual:balafon/core.js").await.unwrap_err();
  assert_eq!(err.kind.code(), "MANDATORY_CONTENT");
  assert!(err
    .contexts()
    .iter()
    .any(|context| context.contains("virtual:balafon/core.js")));
}

#[tokio::test]
async fn each_locale_gets_its_own_chunk() {
  let mut fixture = Fixture::new(Mode::Prod, i18n_options(), FakeRunner::new()).await;
  fixture.write("i18n/en.json", r#"{ "hello": "Hello" }"#);
  fixture.write("i18n/fr.json", r#"{ "hello": "Bonjour" }"#);

  let bundle = fixture.build(&[("index.js", "virtual:balafon/i18n.js")]).await;
  insta::assert_snapshot!(output_friendly_to_snapshot(&bundle), @r###"
  ---------- balafon/i18n/en.js ----------
  export default {"hello":"Hello"};
  ---------- balafon/i18n/fr.js ----------
  export default {"hello":"Bonjour"};
  ---------- index.js ----------
  const en = (await (()=>import(new URL("./balafon/i18n/en.js", import.meta.url).href))());
  const fr = (await (()=>import(new URL("./balafon/i18n/fr.js", import.meta.url).href))());
  export { en };
  export { fr };
  export default { en: en, fr: fr };
  "###);
  assert_eq!(fixture.host.chunks.len(), 2);
  assert!(fixture.host.watched.is_empty());
}

#[tokio::test]
async fn locale_map_and_locale_entry_share_one_chunk() {
  let mut fixture = Fixture::new(Mode::Prod, i18n_options(), FakeRunner::new()).await;
  fixture.write("i18n/en.json", r#"{ "hello": "Hello" }"#);

  let bundle = fixture
    .build(&[
      ("index.js", "virtual:balafon/i18n.js"),
      ("en-entry.js", "virtual:balafon/i18n/en.json"),
    ])
    .await;
  insta::assert_snapshot!(output_friendly_to_snapshot(&bundle), @r###"
  ---------- balafon/i18n/en.js ----------
  export default {"hello":"Hello"};
  ---------- en-entry.js ----------
  export default (await import(new URL("./balafon/i18n/en.js", import.meta.url).href)).default;
  ---------- index.js ----------
  const en = (await (()=>import(new URL("./balafon/i18n/en.js", import.meta.url).href))());
  export { en };
  export default { en: en };
  "###);
  assert_eq!(fixture.host.chunks.len(), 1);
}

#[tokio::test]
async fn unreadable_locale_is_an_empty_namespace_without_a_chunk() {
  let mut fixture = Fixture::new(Mode::Prod, i18n_options(), FakeRunner::new()).await;
  fixture.write("i18n/en.json", r#"{ "hello": "Hello" }"#);
  fixture.write("i18n/fr.json", "{ not json");

  let bundle = fixture.build(&[("index.js", "virtual:balafon/i18n.js")]).await;
  insta::assert_snapshot!(code_of(&bundle, "index.js"), @r###"
  const en = (await (()=>import(new URL("./balafon/i18n/en.js", import.meta.url).href))());
  const fr = { default: {} };
  export { en };
  export { fr };
  export default { en: en, fr: fr };
  "###);
  assert_eq!(fixture.host.chunks.len(), 1);
  assert!(bundle.get("balafon/i18n/fr.js").is_none());
}

#[tokio::test]
async fn icon_library_can_be_an_asset() {
  let runner = FakeRunner::new().respond(command::ICON_LIBRARY, r#"{ "home": "<svg/>" }"#);
  let options = BalafonOptions {
    as_asset: AssetOptions {
      icons: true,
      ..Default::default()
    },
    ..Default::default()
  };
  let mut fixture = Fixture::new(Mode::Prod, options, runner).await;

  let bundle = fixture
    .build(&[("assets/index.js", "virtual:balafon/icons.js")])
    .await;
  assert_eq!(
    code_of(&bundle, "assets/index.js"),
    r#"export default (await import(new URL("../balafon/icons.js", import.meta.url).href)).default;"#
  );
  assert_eq!(
    code_of(&bundle, "balafon/icons.js"),
    r#"export default {"home":"<svg/>"};"#
  );
  assert!(fixture.host.chunks.is_empty());
  assert_eq!(fixture.host.assets.len(), 1);
}

#[tokio::test]
async fn empty_tool_output_emits_nothing() {
  let runner = FakeRunner::new().respond(command::CORE_STYLESHEET, "\n");
  let mut fixture = Fixture::new(Mode::Prod, Default::default(), runner).await;
  assert_eq!(
    fixture.load("virtual:balafon/core.css.js").await.unwrap(),
    "export default null;"
  );
  assert!(fixture.host.chunks.is_empty());
  assert!(fixture.host.assets.is_empty());
}

#[tokio::test]
async fn icons_need_the_template_transform() {
  let mut fixture =
    Fixture::with_transforms(Mode::Prod, Default::default(), FakeRunner::new(), vec![]).await;
  let err = fixture.load("virtual:balafon/icons/home").await.unwrap_err();
  assert_eq!(err.kind.code(), "MISSING_CAPABILITY");
  assert_eq!(fixture.runner.total_calls(), 0);
}

#[tokio::test]
async fn commonjs_output_is_left_alone() {
  let runner = FakeRunner::new()
    .respond(command::ENV, "{}")
    .respond(command::CORE_SCRIPT, "window.core = 1;");
  let mut fixture = Fixture::new(Mode::Prod, Default::default(), runner).await;
  let bundle = fixture
    .host
    .build(
      &fixture.driver,
      &[("index.js", "virtual:balafon/core.js")],
      &OutputOptions {
        dir: None,
        format: ModuleFormat::Cjs,
      },
    )
    .await
    .unwrap();
  assert_eq!(
    code_of(&bundle, "index.js"),
    r#"export default import(new URL("./balafon/core.js", import.meta.url).href);"#
  );
}
