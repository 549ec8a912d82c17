use super::*;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("posterforge-fonts-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn candidates_cover_spacing_variants() {
    let p = DirFontProvider::new("/fonts");
    let names: Vec<String> = p
        .candidates("Playfair Display")
        .iter()
        .map(|c| c.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        [
            "Playfair Display.ttf",
            "Playfair Display.otf",
            "PlayfairDisplay.ttf",
            "PlayfairDisplay.otf",
            "Playfair-Display.ttf",
            "Playfair-Display.otf",
        ]
    );
}

#[tokio::test]
async fn dir_provider_loads_what_exists_and_skips_the_rest() {
    let dir = scratch_dir("dir");
    std::fs::write(dir.join("PlayfairDisplay.otf"), b"font-bytes").unwrap();

    let set = DirFontProvider::new(&dir)
        .ensure_loaded(&["Playfair Display".to_owned(), "Missing Sans".to_owned()])
        .await;
    assert_eq!(set.len(), 1);
    assert_eq!(
        set.resolve("Playfair Display").unwrap().bytes.as_slice(),
        b"font-bytes"
    );

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn static_provider_puts_requested_families_first() {
    let mut fonts = FontSet::new();
    fonts.push("Inter", Arc::new(vec![1]));
    fonts.push("Lora", Arc::new(vec![2]));
    let provider = StaticFontProvider::new(fonts);

    let set = provider.ensure_loaded(&["Lora".to_owned()]).await;
    assert_eq!(set.families().collect::<Vec<_>>(), ["Lora", "Inter"]);
    assert_eq!(set.resolve("Unknown").unwrap().family, "Lora");
}
