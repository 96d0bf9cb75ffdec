// Virtual paths of derived artifacts

/// Virtual path of a bundle's source map
///
/// The suffix is appended without a dot so the path never ends in `.map`;
/// generic static-file handling would otherwise short-circuit the request
/// before it reaches the bundle table.
pub fn map_path(bundle_path: &str) -> String {
    format!("{}map", bundle_path)
}

/// Virtual path of a file's transformed copy
///
/// `/scripts/app.ts` becomes `/scripts/app.transformed.ts`; a file without an
/// extension gets a bare `.transformed` suffix.
pub fn transformed_path(file_path: &str) -> String {
    let name_start = file_path.rfind('/').map_or(0, |i| i + 1);
    let name = &file_path[name_start..];

    match name.rfind('.') {
        Some(dot) if dot > 0 => {
            let split = name_start + dot;
            format!(
                "{}.transformed{}",
                &file_path[..split],
                &file_path[split..]
            )
        }
        _ => format!("{}.transformed", file_path),
    }
}

/// URL written into `//# sourceMappingURL=`
///
/// The map lives next to the bundle, so its last path segment is enough for
/// the browser to resolve it relative to the script URL.
pub fn mapping_url(map_path: &str) -> &str {
    map_path.rsplit('/').next().unwrap_or(map_path)
}
