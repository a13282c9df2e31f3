use std::path::PathBuf;

/// `{prefix}-{id}{ext}`
pub fn file_name(prefix: &str, id: i64, ext: &str) -> String {
    format!("{}-{}{}", prefix, id, ext)
}

/// `{base}/{subdir}/{file}` with repeated separators collapsed, so an empty
/// subdirectory or a trailing slash on the base never produces `//`.
pub fn local_path(base: &str, subdir: &str, file_name: &str) -> String {
    collapse_separators(&format!("{}/{}/{}", base, subdir, file_name))
}

pub fn parent_dir(path: &str) -> PathBuf {
    match path.rfind('/') {
        Some(0) => PathBuf::from("/"),
        Some(i) => PathBuf::from(&path[..i]),
        None => PathBuf::from("."),
    }
}

fn collapse_separators(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_sep = false;
    for ch in s.chars() {
        if ch == '/' {
            if !prev_sep { out.push(ch); }
            prev_sep = true;
        } else {
            out.push(ch);
            prev_sep = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_prefixed_file_name() {
        assert_eq!(file_name("foto", 42, ".jpg"), "foto-42.jpg");
        assert_eq!(file_name("doc", 7, ".unknown"), "doc-7.unknown");
    }

    #[test]
    fn joins_base_subdir_and_file() {
        assert_eq!(local_path("uploads", "2020", "foto-1.jpg"), "uploads/2020/foto-1.jpg");
        assert_eq!(local_path("/srv/files", "a/b", "f-1.png"), "/srv/files/a/b/f-1.png");
    }

    #[test]
    fn never_yields_double_separators() {
        let bases = ["uploads", "uploads/", "/uploads//", "./up", "/"];
        let subdirs = ["", "/", "x", "/x/", "x//y", "//"];
        for base in bases {
            for sub in subdirs {
                let p = local_path(base, sub, "foto-1.jpg");
                assert!(!p.contains("//"), "{base:?} + {sub:?} -> {p}");
                assert!(p.ends_with("/foto-1.jpg"), "{p}");
            }
        }
    }

    #[test]
    fn parent_dir_of_built_paths() {
        assert_eq!(parent_dir("uploads/2020/foto-1.jpg"), PathBuf::from("uploads/2020"));
        assert_eq!(parent_dir("/foto-1.jpg"), PathBuf::from("/"));
        assert_eq!(parent_dir("foto-1.jpg"), PathBuf::from("."));
    }
}
