use std::fs;
use texmark_core::{ParseOptions, TexmarkError, parse_document};
use texmark_latex::{ConvertOptions, Postprocessor, Workspace, convert_str, render_document};

fn convert(input: &str) -> String {
    convert_str(input, &ConvertOptions::default()).unwrap()
}

/// The text between `\begin{document}` and `\end{document}`.
fn body(tex: &str) -> &str {
    let start = tex.find("\\begin{document}").unwrap() + "\\begin{document}".len();
    let end = tex.rfind("\\end{document}").unwrap();
    tex[start..end].trim()
}

const SCENARIO: &str = "# Title\n\nHello *world*\n\n| a | b |\n|---|---|\n| 1 | 2 |\n";

fn assert_scenario(tex: &str) {
    assert!(tex.starts_with("\\documentclass{article}"));
    assert!(tex.contains("\\title{Title}"));
    assert!(tex.contains("\\maketitle"));
    assert!(tex.contains("Hello \\emph{world}"));
    assert!(tex.contains("\\begin{tabular}{|l|l|}"));
    assert!(tex.contains("\\textbf{a} & \\textbf{b} \\\\"));
    assert!(tex.contains("1 & 2 \\\\"));
    assert!(!tex.contains("<table"));
    assert!(!tex.contains("plaintext"));
}

#[test]
fn scenario_with_gfm_tables() {
    assert_scenario(&convert(SCENARIO));
}

#[test]
fn scenario_with_pipe_table_text() {
    let options = ConvertOptions {
        gfm_tables: false,
        ..ConvertOptions::default()
    };
    assert_scenario(&convert_str(SCENARIO, &options).unwrap());
}

#[test]
fn document_body_snapshot() {
    let options = ConvertOptions {
        author: "Ada".to_string(),
        ..ConvertOptions::default()
    };
    let tex = convert_str("## Intro\n\nSee <http://x.test>.\n", &options).unwrap();
    assert!(tex.contains("\\author{Ada}"));
    insta::assert_snapshot!(body(&tex), @r"
    \section{Intro}

    See \url{http://x.test}.
    ");
}

#[test]
fn plain_text_is_only_escaped() {
    assert_eq!(body(&convert("50% of #1 & co\n")), r"50\% of \#1 \& co");
}

#[test]
fn ordered_list_counter_starts_one_below() {
    let tex = convert("3. third\n4. fourth\n");
    assert!(tex.contains("\\begin{enumerate}\\setcounter{enumi}{2}\n"));
    assert!(tex.contains("\\item third"));
}

#[test]
fn colspan_table_gets_three_column_slots() {
    let tex = convert(
        "<table><tr><th colspan=\"2\">wide</th></tr><tr><td>1</td><td>2</td><td>3</td></tr></table>\n",
    );
    assert!(tex.contains("\\begin{tabular}{|l|l|l|}"));
    assert!(tex.contains("\\multicolumn{2}{|c|}{\\textbf{wide}}"));
}

#[test]
fn only_paired_quotes_become_enquote() {
    let tex = convert("&ldquo;hello&rdquo; world &ldquo;unmatched\n");
    assert!(tex.contains("\\enquote{hello} world \u{201c}unmatched"));
}

#[test]
fn lone_image_becomes_figure() {
    let tex = convert("![Result](fig.png)\n");
    assert!(tex.contains("\\includegraphics[max width=\\linewidth]{fig.png}"));
    assert!(tex.contains("\\caption{Result}"));
    assert!(tex.contains("\\begin{figure}[H]"));
}

#[test]
fn links_become_url_or_href() {
    let tex = convert("<http://x.test> and [click here](http://x.test)\n");
    assert!(tex.contains("\\url{http://x.test} and \\href{http://x.test}{click here}"));
}

#[test]
fn footnotes_and_math() {
    let tex = convert("Claim[^1] with $a * b$.\n\n[^1]: Source here.\n");
    assert!(tex.contains("Claim\\footnote{Source here.} with \\(a \\cdot b\\)."));
}

#[test]
fn attribute_text_survives_unescape_and_math() {
    let tex = convert("[a $x$ link](http://x.test/$y$)\n\n![wait...](a$1$.png)\n");
    assert!(tex.contains("\\href{http://x.test/$y$}{a \\(x\\) link}"));
    assert!(tex.contains("{a$1$.png}"));
    assert!(tex.contains("\\caption{wait\\dots{}}"));
}

#[test]
fn hand_written_table_text_is_escaped_once() {
    let tex = convert(
        "<table><tr><th colspan=\"2\">R&amp;D</th></tr>\
         <tr><td>50%</td><td>a &amp; b #1</td></tr></table>\n",
    );
    assert!(tex.contains("\\begin{tabular}{|l|l|}"));
    assert!(tex.contains("\\multicolumn{2}{|c|}{\\textbf{R\\&D}} \\\\"));
    assert!(tex.contains("50\\% & a \\& b \\#1 \\\\"));
}

#[test]
fn less_than_in_table_cells_is_kept() {
    let tex = convert("| x<y | n<k and m>j |\n|---|---|\n| p<q | 2 |\n");
    assert!(tex.contains("\\textbf{x<y} & \\textbf{n<k and m>j} \\\\"));
    assert!(tex.contains("p<q & 2 \\\\"));
}

#[test]
fn less_than_in_link_text() {
    let tex = convert("see [a < b](http://x.test) now\n");
    assert!(tex.contains("see \\href{http://x.test}{a < b} now"));
    assert!(!tex.contains("<a "));
}

#[test]
fn literal_entity_text_is_not_decoded() {
    let tex = convert("Write &amp;hellip; or &amp;copy; literally\n");
    assert!(tex.contains("Write \\&hellip; or \\&copy; literally"));
}

#[test]
fn chain_is_idempotent_on_its_output() {
    let source = "# T\n\n\
                  Some \"quoted\" text... &ldquo;pair&rdquo; &mdash; 5% off\n\n\
                  - one\n- two [link](http://x.test)\n\n\
                  ![Fig](f.png)\n\n\
                  | a | b |\n|---|---|\n| 1 | 2 |\n\n\
                  Math $x^2$ and\n\n$$\ny = mx\n$$\n";
    let root = parse_document(source, &ParseOptions::default()).unwrap();
    let rendered = render_document(root).unwrap();
    let chain = Postprocessor::standard();
    let once = chain.run(&rendered).unwrap();
    let twice = chain.run(&once).unwrap();
    assert_eq!(twice, once);
}

#[test]
fn empty_link_text_is_rejected() {
    assert!(matches!(
        convert_str("[](http://x.test)\n", &ConvertOptions::default()),
        Err(TexmarkError::UnresolvableLink { .. })
    ));
}

#[test]
fn oversized_colspan_is_rejected() {
    assert!(matches!(
        convert_str(
            "<table><tr><td colspan=\"18446744073709551615\">a</td><td>b</td></tr></table>\n",
            &ConvertOptions::default()
        ),
        Err(TexmarkError::MalformedAttribute { .. })
    ));
}

#[test]
fn ragged_pipe_table_is_rejected() {
    let options = ConvertOptions {
        gfm_tables: false,
        ..ConvertOptions::default()
    };
    let err = convert_str("| a | b |\n|---|---|\n| 1 | 2 | 3 |\n", &options).unwrap_err();
    assert!(matches!(
        err,
        TexmarkError::TableShape {
            expected: 2,
            found: 3,
            ..
        }
    ));
}

#[test]
fn malformed_colspan_is_rejected() {
    let err = convert_str(
        "<table><tr><td colspan=\"wide\">a</td></tr></table>\n",
        &ConvertOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, TexmarkError::MalformedAttribute { .. }));
}

#[test]
fn failed_conversion_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.md"), "[](http://x.test)\n").unwrap();
    fs::write(dir.path().join("good.md"), "# Good\n").unwrap();
    let workspace = Workspace::new(dir.path());

    assert!(workspace.convert_file("bad.md", "bad.tex").is_err());
    assert!(!dir.path().join("bad.tex").exists());

    workspace.convert_file("good.md", "out/good.tex").unwrap_err();
    fs::create_dir(dir.path().join("out")).unwrap();
    let written = workspace.convert_file("good.md", "out/good.tex").unwrap();
    assert!(fs::read_to_string(written).unwrap().contains("\\title{Good}"));
}
