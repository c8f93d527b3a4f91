//! Shared fixtures for the call hierarchy integration tests
#![allow(dead_code)]

use callhier::{
    CallHierarchyHandler, CancellationToken, ContentId, HierarchyKind, HierarchyNode,
    IncomingCall, LibraryArtifact, OutgoingCall, Position, WorkspaceHost,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const HELLO_ROOT: &str = "/workspace/hello";
pub const SALUT_ROOT: &str = "/workspace/salut";

pub const CALL_HIERARCHY_PATH: &str = "src/org/sample/CallHierarchy.java";
pub const CALL_HIERARCHY_OTHER_PATH: &str = "src/org/sample/CallHierarchyOther.java";
pub const SALUT_CALL_HIERARCHY_PATH: &str = "src/main/java/org/sample/CallHierarchy.java";

pub const RT_JAR: &str = "rt.jar";
pub const COMMONS_LANG: &str = "commons-lang3-3.5.jar";
pub const WORD_UTILS: &str = "org.apache.commons.lang3.text.WordUtils";

pub const CALL_HIERARCHY: &str = r#"package org.sample;

public class CallHierarchy {

    @Deprecated
    public static void main(String[] args) {
        new Child().bar();
    }

}

class Base {

    /** Incremented by every new instance. */
    protected int protectedField = 200;


    // Constructor
    public Base() {
/*should resolve to enclosing "method/constructor/initializer"*/
        protectedField++;
    }
    public void foo() {
    }

    /** Creates a child on the current thread. */
    public void bar() {
        new Child();
        Thread.currentThread();
    }
}

class Child extends Base {
    protected void method_1() {
        foo();
        bar();
    }

    void twice() {
        foo();
        foo();
    }
    public Child() {
        super();
        bar();
    }
}
"#;

pub const CALL_HIERARCHY_OTHER: &str = r#"package org.sample;

public class CallHierarchyOther {

  {
    new FooBuilder();
  }

  public static class FooBuilder {
    public FooBuilder() { new X(); }
  }
  @Deprecated public static class X {
  }
}
"#;

pub const SALUT_CALL_HIERARCHY: &str = r#"package org.sample;

import org.apache.commons.lang3.text.WordUtils;

/**
 * Capitalizes a name with commons-lang.
 */
public class CallHierarchy {

    private final String name;

    public CallHierarchy(String name) {
        this.name = name;
    }
    public Object build() {
        return WordUtils.capitalize(name);
    }
}
"#;

pub const WORD_UTILS_SOURCE: &str = r#"package org.apache.commons.lang3.text;

public class WordUtils {

    public WordUtils() {
        super();
    }

    public static String capitalize(final String str) {
        return capitalize(str, null);
    }

    public static String capitalize(final String str, final char... delimiters) {
        final int delimLen = delimiters == null ? -1 : delimiters.length;
        if (str == null || str.isEmpty() || delimLen == 0) {
            return str;
        }
        final char[] buffer = str.toCharArray();
        boolean capitalizeNext = true;
        for (int i = 0; i < buffer.length; i++) {
            final char ch = buffer[i];
            if (isDelimiter(ch, delimiters)) {
                capitalizeNext = true;
            } else if (capitalizeNext) {
                buffer[i] = Character.toTitleCase(ch);
                capitalizeNext = false;
            }
        }
        return new String(buffer);
    }

    private static boolean isDelimiter(final char ch, final char[] delimiters) {
        if (delimiters == null) {
            return Character.isWhitespace(ch);
        }
        for (final char delimiter : delimiters) {
            if (ch == delimiter) {
                return true;
            }
        }
        return false;
    }
}
"#;

pub const THREAD_SOURCE: &str = r#"package java.lang;

public class Thread implements Runnable {

    public static Thread currentThread() {
        return null;
    }

    public void run() {
    }
}
"#;

pub fn rt_jar() -> LibraryArtifact {
    let mut artifact = LibraryArtifact::new(RT_JAR);
    // Listed but without attached source
    artifact.add_type("java.lang.Object", None);
    artifact.with_source("java.lang.Thread", THREAD_SOURCE)
}

pub fn commons_lang() -> LibraryArtifact {
    LibraryArtifact::new(COMMONS_LANG).with_source(WORD_UTILS, WORD_UTILS_SOURCE)
}

/// The plain source project: `CallHierarchy` and `CallHierarchyOther`
pub fn hello_host() -> WorkspaceHost {
    let mut host = WorkspaceHost::new(HELLO_ROOT);
    host.set_file(CALL_HIERARCHY_PATH, CALL_HIERARCHY);
    host.set_file(CALL_HIERARCHY_OTHER_PATH, CALL_HIERARCHY_OTHER);
    host.add_library(rt_jar());
    host
}

/// The project depending on commons-lang
pub fn salut_host() -> WorkspaceHost {
    let mut host = WorkspaceHost::new(SALUT_ROOT);
    host.set_file(SALUT_CALL_HIERARCHY_PATH, SALUT_CALL_HIERARCHY);
    host.add_library(rt_jar());
    host.add_library(commons_lang());
    host
}

pub fn uri(root: &str, relative: &str) -> String {
    ContentId::workspace(Path::new(root).join(relative)).uri()
}

pub fn prepare(
    host: &WorkspaceHost,
    uri: &str,
    line: u32,
    character: u32,
) -> Option<Vec<HierarchyNode>> {
    CallHierarchyHandler::new(host)
        .prepare_call_hierarchy(uri, Position::new(line, character), &CancellationToken::new())
        .expect("prepare should not fail")
}

/// Prepare and expect exactly one item
pub fn prepare_one(host: &WorkspaceHost, uri: &str, line: u32, character: u32) -> HierarchyNode {
    let mut items = prepare(host, uri, line, character).expect("an item at the position");
    assert_eq!(items.len(), 1, "expected exactly one item");
    items.remove(0)
}

pub fn incoming(host: &WorkspaceHost, item: &HierarchyNode) -> Vec<IncomingCall> {
    CallHierarchyHandler::new(host)
        .incoming_calls(item, &CancellationToken::new())
        .expect("incoming calls should not fail")
}

pub fn outgoing(host: &WorkspaceHost, item: &HierarchyNode) -> Vec<OutgoingCall> {
    CallHierarchyHandler::new(host)
        .outgoing_calls(item, &CancellationToken::new())
        .expect("outgoing calls should not fail")
}

/// Check the visible parts of an item
pub fn assert_item(
    item: &HierarchyNode,
    name: &str,
    kind: HierarchyKind,
    detail: &str,
    deprecated: bool,
    selection_line: u32,
) {
    assert_eq!(item.name, name);
    assert_eq!(item.kind, kind, "kind of {name}");
    assert_eq!(item.detail, detail, "detail of {name}");
    assert_eq!(item.is_deprecated(), deprecated, "deprecation of {name}");
    assert_eq!(
        item.selection_range.start.line, selection_line,
        "selection line of {name}"
    );
}

/// The hello project written to disk, with rt.jar sources under `lib/rt`
pub struct DiskProject {
    pub dir: TempDir,
}

impl DiskProject {
    pub fn hello() -> Self {
        let project = Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        };
        project.add_file(CALL_HIERARCHY_PATH, CALL_HIERARCHY);
        project.add_file(CALL_HIERARCHY_OTHER_PATH, CALL_HIERARCHY_OTHER);
        project.add_file("lib/rt/java/lang/Thread.java", THREAD_SOURCE);
        project
    }

    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn uri(&self, relative: &str) -> String {
        ContentId::workspace(self.path().join(relative)).uri()
    }
}
