//! Low-level serialization of one testsuite document.

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::io::Write;
use std::time::Duration;

use crate::capture::CapturedOutput;
use crate::error::ReportError;
use crate::outcome::OutcomeRecord;

static TESTSUITE_TAG: &str = "testsuite";
static TESTCASE_TAG: &str = "testcase";
static SYSTEM_OUT_TAG: &str = "system-out";
static SYSTEM_ERR_TAG: &str = "system-err";

/// Writes one complete, pretty-printed XML document for a suite.
///
/// The document is tab-indented, carries a UTF-8 declaration, and wraps every
/// piece of free-form text (traces, captured output) in CDATA so markup
/// characters inside it are never interpreted as structure.
pub fn write_suite_document<W: Write>(
    suite: &str,
    records: &[&OutcomeRecord],
    captured: &CapturedOutput,
    writer: &mut W,
) -> Result<(), ReportError> {
    let mut xml = Writer::new_with_indent(&mut *writer, b'\t', 1);

    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let tests = records.len();
    let failures = records.iter().filter(|r| r.status.is_failure()).count();
    let errors = records.iter().filter(|r| r.status.is_error()).count();
    let total: Duration = records.iter().map(|r| r.elapsed).sum();

    let mut testsuite = BytesStart::new(TESTSUITE_TAG);
    testsuite.extend_attributes([
        ("name", suite),
        ("tests", tests.to_string().as_str()),
        ("time", format_time(total).as_str()),
        ("failures", failures.to_string().as_str()),
        ("errors", errors.to_string().as_str()),
    ]);
    xml.write_event(Event::Start(testsuite))?;

    for record in records {
        serialize_testcase(suite, record, &mut xml)?;
    }

    serialize_output(SYSTEM_OUT_TAG, &captured.stdout, &mut xml)?;
    serialize_output(SYSTEM_ERR_TAG, &captured.stderr, &mut xml)?;

    xml.write_event(Event::End(BytesEnd::new(TESTSUITE_TAG)))?;
    drop(xml);

    writer.write_all(b"\n")?;
    Ok(())
}

fn serialize_testcase<W: Write>(
    suite: &str,
    record: &OutcomeRecord,
    xml: &mut Writer<W>,
) -> Result<(), ReportError> {
    // Registration hands over unqualified names, but a dotted identity still
    // reports only its last segment.
    let name = record
        .id
        .name
        .rsplit('.')
        .next()
        .unwrap_or(record.id.name.as_str());

    let mut testcase = BytesStart::new(TESTCASE_TAG);
    testcase.extend_attributes([
        ("classname", suite),
        ("name", name),
        ("time", format_time(record.elapsed).as_str()),
    ]);

    // `element_tag` and `detail` are both `Some` exactly when the test did
    // not succeed.
    let Some((tag, detail)) = record.status.element_tag().zip(record.status.detail()) else {
        xml.write_event(Event::Empty(testcase))?;
        return Ok(());
    };

    xml.write_event(Event::Start(testcase))?;

    let mut nested = BytesStart::new(tag);
    nested.extend_attributes([
        ("type", detail.type_name.as_str()),
        ("message", detail.message.as_str()),
    ]);
    xml.write_event(Event::Start(nested))?;
    write_cdata(&detail.trace, xml)?;
    xml.write_event(Event::End(BytesEnd::new(tag)))?;

    xml.write_event(Event::End(BytesEnd::new(TESTCASE_TAG)))?;
    Ok(())
}

fn serialize_output<W: Write>(
    tag: &'static str,
    text: &str,
    xml: &mut Writer<W>,
) -> Result<(), ReportError> {
    xml.write_event(Event::Start(BytesStart::new(tag)))?;
    write_cdata(text, xml)?;
    xml.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Emits `text` as CDATA. A literal `]]>` would terminate a CDATA section
/// early, so the text is split across adjacent sections at each occurrence;
/// parsers concatenate them back to the original text.
fn write_cdata<W: Write>(text: &str, xml: &mut Writer<W>) -> Result<(), ReportError> {
    let mut rest = text;
    while let Some(index) = rest.find("]]>") {
        let (head, tail) = rest.split_at(index + 2);
        xml.write_event(Event::CData(BytesCData::new(head)))?;
        rest = tail;
    }
    xml.write_event(Event::CData(BytesCData::new(rest)))?;
    Ok(())
}

/// Seconds with exactly three fractional digits.
pub(crate) fn format_time(time: Duration) -> String {
    format!("{:.3}", time.as_secs_f64())
}
