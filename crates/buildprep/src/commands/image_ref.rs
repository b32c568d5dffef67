use buildprep_build::image_ref;
use colored::Colorize;

/// ラベルからタグを取り出すための指定（ラベル名と、イメージから読んだ値）
pub struct TagsLabel<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

pub fn handle(
    reference: &str,
    digest: Option<&str>,
    tag_suffix: &str,
    tags: &[String],
    tags_label: Option<TagsLabel<'_>>,
) -> anyhow::Result<()> {
    let _guard = tracing::info_span!("image_ref", reference = %reference).entered();

    let name = image_ref::image_name(reference);
    if !image_ref::is_image_name_valid(&name) {
        anyhow::bail!("イメージ名が不正です: {}", name);
    }

    let rest = &reference[name.len()..];
    let (tag, ref_digest) = match rest.split_once('@') {
        Some((tag, digest)) => (tag, Some(digest)),
        None => (rest, None),
    };
    if let Some(tag) = tag.strip_prefix(':')
        && !image_ref::is_image_tag_valid(tag)
    {
        anyhow::bail!("タグが不正です: {}", tag);
    }
    if let Some(ref_digest) = ref_digest
        && !image_ref::is_image_digest_valid(ref_digest)
    {
        anyhow::bail!("ダイジェストが不正です: {}", ref_digest);
    }

    tracing::debug!("Image reference {} is valid", reference);
    eprintln!("{}", "✓ イメージ参照は有効です".green());
    println!("{}", name);

    if let Some(digest) = digest {
        if !image_ref::is_image_digest_valid(digest) {
            anyhow::bail!("ダイジェストが不正です: {}", digest);
        }
        if !image_ref::is_tag_suffix_valid(tag_suffix) {
            anyhow::bail!("タグサフィックスが不正です: {}", tag_suffix);
        }
        println!(
            "{}:{}",
            name,
            image_ref::containerfile_artifact_tag(digest, tag_suffix)
        );
        println!("{}", buildprep_config::CONTAINERFILE_ARTIFACT_TYPE);
    }

    image_ref::validate_tags(tags)?;
    let mut all_tags = tags.to_vec();
    if let Some(label) = tags_label {
        all_tags.extend(image_ref::tags_from_label(label.name, label.value)?);
    }
    for tag in &all_tags {
        println!("{}:{}", name, tag);
    }
    Ok(())
}
