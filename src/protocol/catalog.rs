//! Built-in command catalog
//!
//! Static request and response layouts for every command the client knows.
//! The tables are pure data; [`Catalog::builtin`] indexes them once per
//! process and hands out a shared read-only reference.
//!
//! ## Key Families
//! ```text
//! 01xxxx  CPL            05xxxx  product / clock     0Axxxx  macro & trigger cues
//! 02xxxx  KDM            06xxxx  assets              0Cxxxx  security manager log
//! 03xxxx  SPL playback   07xxxx  ingest              0Exxxx  session
//! 04xxxx  scheduler      08xxxx  storage / SNMP      11xxxx  device logs
//! ```
//!
//! A request `xxNNyy` is answered by `xx(NN+1)yy`. A non-zero `yy` marks
//! a "V2" variant of the command.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crate::error::{DcpError, Result};

use super::message::{
    CommandKey, Decoder, RequestDefinition, RequestField, ResponseBatch, ResponseDefinition,
    ResponseElement, ResponseField, TextTable, STATUS_FIELD,
};
use super::registry::{RequestRegistry, ResponseRegistry};

/// Reply budget for KDM storage, which validates signatures on the device
pub const STORE_KDM_TIMEOUT: Duration = Duration::from_secs(90);

// =============================================================================
// Translation Tables
// =============================================================================

pub const STORAGE: TextTable = &[(1, "local"), (2, "remote"), (3, "local+remote")];

pub const CONTENT_KIND: TextTable = &[
    (0, "Unknown"),
    (1, "Feature"),
    (2, "Trailer"),
    (3, "Test"),
    (4, "Teaser"),
    (5, "Rating"),
    (6, "Advertisement"),
    (7, "Short"),
    (8, "Transitional"),
    (9, "PSA"),
    (10, "Policy"),
    (128, "Live CPL"),
];

pub const ESSENCE_ENCODING: TextTable = &[
    (0, "Unknown"),
    (1, "MPEG2"),
    (2, "JPEG2000"),
    (3, "Audio PCM"),
];

pub const ENCRYPTION: TextTable = &[(0, "No Encryption"), (1, "AES 128 CBC")];

pub const VALIDATION_ERROR: TextTable = &[
    (0, "No Error nor warning"),
    (1, "CPL is not registered on this server"),
    (2, "CPL is partially registered on this server"),
    (3, "CPL is registered on this server but cannot be loaded"),
    (4, "CPL requires at least one KDL to play; no KDM found"),
    (5, "CPL requires at least one KDL to play; out-dated KDM found"),
    (6, "CPL requires at least one KDL to play; KDM built with a wrong certificate"),
    (
        7,
        "CPL requires at least one KDL to play; all KDM are rejected (the RTC is no longer secured)",
    ),
    (
        8,
        "CPL requires at least one KDL to play; all KDM are rejected (playback of protected content is forbidden)",
    ),
    (
        9,
        "CPL requires at least one KDL to play; KDM with invalid content authenticator found",
    ),
    (10, "CPL signature check failed"),
    (255, "Out of memory"),
];

pub const SCHEMAS: TextTable = &[(0, "Unknown"), (1, "Digicine (Interop)"), (2, "SMPTE")];

pub const STREAM_TYPE: TextTable = &[(0, "None"), (1, "FTP Stream"), (2, "FTP Stream + Ingest")];

pub const PLAYBACK_STATE: TextTable = &[(0, "Error/Unknown"), (1, "Stop"), (2, "Play"), (3, "Pause")];

pub const SCHEDULE_STATUS: TextTable = &[
    (0, "RecordedInDatabase"),
    (1, "SuccessfullyScheduled"),
    (2, "ScheduleFailed"),
];

pub const SCHEDULE_STATUS_V2: TextTable = &[
    (0, "RecordedInDatabase"),
    (1, "SuccessfullyScheduled"),
    (2, "ScheduleFailed"),
    (3, "Schedule does not start because a show was running"),
];

pub const LOOP_MODE: TextTable = &[
    (0, "PlayOnce"),
    (1, "PlayLoop"),
    (2, "PlayThenRewind"),
    (3, "PlayThenEject"),
];

pub const SHOW_ELEMENT_STATUS: TextTable = &[
    (0, "Unknown"),
    (1, "Pending"),
    (2, "Executing"),
    (3, "Executed"),
    (4, "Executed With Error"),
    (5, "Execution Interrupted"),
    (6, "Execution Failed"),
    (7, "Not Executed"),
    (8, "Waiting"),
];

pub const JOB_STATUS: TextTable = &[
    (0, "pending"),
    (1, "paused"),
    (2, "running"),
    (3, "scheduled"),
    (4, "done"),
    (5, "aborted"),
    (6, "unused"),
    (7, "failed"),
];

pub const MACRO_EXECUTION: TextTable = &[
    (3, "Executed with success"),
    (4, "Executed with error"),
    (5, "Partially executed but interrupted"),
    (6, "Execution failed"),
    (7, "Not executed"),
];

// =============================================================================
// Catalog
// =============================================================================

/// Both directions of the command table
#[derive(Debug, Clone)]
pub struct Catalog {
    pub requests: RequestRegistry,
    pub responses: ResponseRegistry,
}

impl Catalog {
    pub fn new(requests: RequestRegistry, responses: ResponseRegistry) -> Self {
        Self {
            requests,
            responses,
        }
    }

    /// Index the built-in tables
    pub fn load() -> Result<Self> {
        Ok(Self::new(
            RequestRegistry::new(request_definitions())?,
            ResponseRegistry::new(response_definitions())?,
        ))
    }

    /// Process-wide catalog, built on first use
    pub fn builtin() -> Result<Arc<Catalog>> {
        static BUILTIN: OnceLock<std::result::Result<Arc<Catalog>, String>> = OnceLock::new();

        BUILTIN
            .get_or_init(|| Catalog::load().map(Arc::new).map_err(|e| e.to_string()))
            .clone()
            .map_err(DcpError::Configuration)
    }
}

// =============================================================================
// Layout Helpers
// =============================================================================

/// `0x010100` -> key `01 01 00`
const fn key(code: u32) -> CommandKey {
    CommandKey::new([(code >> 16) as u8, (code >> 8) as u8, code as u8])
}

fn request(name: &str, code: u32, fields: Vec<RequestField>) -> RequestDefinition {
    RequestDefinition::new(name, key(code), fields)
}

fn response(name: &str, code: u32, fields: Vec<ResponseElement>) -> ResponseDefinition {
    ResponseDefinition::new(name, key(code), fields)
}

fn at(name: &str, start: isize, end: isize, decoder: Decoder) -> ResponseElement {
    ResponseField::new(name, start, Some(end), decoder).into()
}

fn int(name: &str, start: isize, end: isize) -> ResponseElement {
    at(name, start, end, Decoder::Int)
}

fn text(name: &str, start: isize, end: isize) -> ResponseElement {
    at(name, start, end, Decoder::Text)
}

fn uuid(name: &str, start: isize, end: isize) -> ResponseElement {
    at(name, start, end, Decoder::Uuid)
}

fn uuids(name: &str, start: isize, end: isize) -> ResponseElement {
    at(name, start, end, Decoder::UuidList)
}

fn coded(name: &str, start: isize, end: isize, table: TextTable) -> ResponseElement {
    ResponseField::new(name, start, Some(end), Decoder::Int)
        .with_text(table)
        .into()
}

fn status() -> ResponseElement {
    ResponseField::new(STATUS_FIELD, -1, None, Decoder::Int).into()
}

/// `amount`, `item_length`, then packed UUIDs up to the status byte
fn uuid_list() -> Vec<ResponseElement> {
    vec![
        int("amount", 0, 4),
        int("item_length", 4, 8),
        uuids("list", 8, -1),
        status(),
    ]
}

/// Status byte only
fn ack() -> Vec<ResponseElement> {
    vec![status()]
}

/// Variable-length text document followed by the status byte
fn document(name: &str) -> Vec<ResponseElement> {
    vec![text(name, 0, -1), status()]
}

/// Shared head of the CPL information replies
fn cpl_info_head() -> Vec<ResponseElement> {
    vec![
        uuid("cpl_uuid", 0, 16),
        coded("storage", 16, 17, STORAGE),
        text("content_title_text", 17, 145),
        coded("content_kind", 145, 146, CONTENT_KIND),
        int("duration", 146, 150),
        int("edit_rate_a", 150, 154),
        int("edit_rate_b", 154, 158),
        coded("picture_encoding", 158, 159, ESSENCE_ENCODING),
        int("picture_width", 159, 161),
        int("picture_height", 161, 163),
        coded("picture_encryption", 163, 164, ENCRYPTION),
        coded("sound_encoding", 164, 165, ESSENCE_ENCODING),
        int("sound_channel_count", 165, 166),
        int("sound_quantization_bits", 166, 167),
        coded("sound_encryption", 167, 168, ENCRYPTION),
    ]
}

/// Shared head of the KDM information replies
fn kdm_info_head() -> Vec<ResponseElement> {
    vec![
        uuid("kdm_uuid", 0, 16),
        uuid("cpl_uuid", 16, 32),
        int("not_valid_before", 32, 40),
        int("not_valid_after", 40, 48),
    ]
}

/// Playback status shared by both show playlist status replies
fn playback_status() -> Vec<ResponseElement> {
    vec![
        coded("playback_state", 0, 1, PLAYBACK_STATE),
        uuid("spl_id", 1, 17),
        int("spl_position", 17, 21),
        int("spl_duration", 21, 25),
        uuid("cpl_id", 25, 41),
        uuid("event_id", 41, 57),
        uuid("element_id", 57, 73),
        int("element_position", 73, 77),
        int("element_duration", 77, 81),
    ]
}

fn validation_request(name: &str, code: u32) -> RequestDefinition {
    request(
        name,
        code,
        vec![
            RequestField::uuid("uuid"),
            RequestField::text("time", 32),
            RequestField::int("level", 4),
        ],
    )
}

fn with_uuid(name: &str, code: u32) -> RequestDefinition {
    request(name, code, vec![RequestField::uuid("uuid")])
}

fn bare(name: &str, code: u32) -> RequestDefinition {
    request(name, code, Vec::new())
}

// =============================================================================
// Requests
// =============================================================================

/// Every built-in request layout
pub fn request_definitions() -> Vec<RequestDefinition> {
    vec![
        // CPL
        bare("GetCPLList", 0x010100),
        with_uuid("GetCPLInfo", 0x010300),
        with_uuid("GetCPLInfo2", 0x010301),
        with_uuid("DeleteCPL", 0x010500),
        with_uuid("RetrieveCPL", 0x010700),
        request("StoreCPL", 0x010900, vec![RequestField::document("xml")]),
        validation_request("ValidateCPL", 0x010B00),
        with_uuid("GetCPLSize", 0x010D00),
        with_uuid("GetCPLMarker", 0x010F00),
        with_uuid("GetCPLPlayStat", 0x011100),
        // KDM
        bare("GetKDMList", 0x020100),
        with_uuid("GetKDMInfo", 0x020300),
        with_uuid("GetKDMInfo2", 0x020301),
        with_uuid("DeleteKDM", 0x020500),
        with_uuid("RetrieveKDM", 0x020700),
        request("StoreKDM", 0x020900, vec![RequestField::document("xml")])
            .with_timeout(STORE_KDM_TIMEOUT),
        // SPL
        bare("GetSPLList", 0x030100),
        with_uuid("GetSPLInfo", 0x030300),
        with_uuid("DeleteSPL", 0x030500),
        with_uuid("LoadSPLByUUID", 0x030900),
        bare("PlaySPL", 0x030B00),
        bare("PauseSPL", 0x030D00),
        bare("EjectSPL", 0x030F00),
        bare("SkipForward", 0x031100),
        bare("SkipBackward", 0x031300),
        request("JumpForward", 0x031500, vec![RequestField::int("duration", 4)]),
        request("JumpBackward", 0x031700, vec![RequestField::int("duration", 4)]),
        request("LoopModeSPL", 0x031900, vec![RequestField::int("loop_mode", 1)]),
        bare("StatusSPL", 0x031B00),
        request("StatusSPL2", 0x031B01, vec![RequestField::int("flags", 4)]),
        with_uuid("RetrieveSPL", 0x031D00),
        request("StoreSPL", 0x031F00, vec![RequestField::document("xml")]),
        with_uuid("SkipToEvent", 0x032100),
        bare("GetLoopModeSPL", 0x032300),
        validation_request("ValidateSPL", 0x032500),
        bare("GetShowElementStatus", 0x032B00),
        bare("CheckSPLLoadProgress", 0x033100),
        // Scheduler
        request(
            "AddSchedule",
            0x040100,
            vec![
                RequestField::uuid("spl_id"),
                RequestField::int("time_begin", 8),
                RequestField::text("annotation_text", 128),
            ],
        ),
        request(
            "AddSchedule2",
            0x040101,
            vec![
                RequestField::uuid("spl_id"),
                RequestField::text("time", 32),
                RequestField::int("duration", 4),
                RequestField::int("flags", 8),
                RequestField::text("annotation_text", 128),
            ],
        ),
        request("DeleteSchedule", 0x040300, vec![RequestField::int("schedule_id", 8)]),
        request(
            "GetScheduleList",
            0x040500,
            vec![
                RequestField::int("time_begin", 8),
                RequestField::int("time_end", 8),
            ],
        ),
        request("GetScheduleInfo", 0x040700, vec![RequestField::int("id", 8)]),
        request("GetScheduleInfo2", 0x040701, vec![RequestField::int("id", 8)]),
        bare("GetCurrentSchedule", 0x040900),
        bare("GetNextSchedule", 0x040B00),
        request("SetSchedulerEnable", 0x040D00, vec![RequestField::flag("enable")]),
        bare("GetSchedulerEnable", 0x040F00),
        // Product
        bare("GetProductInfo", 0x050100),
        request("GetProductCertificate", 0x050300, vec![RequestField::int("type", 1)]),
        bare("GetAPIProtocolVersion", 0x050500),
        request(
            "GetTimeUTC",
            0x050700,
            vec![RequestField::int("clock_id", 1).with_default(1u32)],
        ),
        bare("GetTimeZone", 0x051F00),
        // Assets
        bare("GetAssetList", 0x060100),
        with_uuid("GetAssetInfo", 0x060300),
        with_uuid("RetrieveAssetXML", 0x060500),
        with_uuid("GetAssetURL", 0x060900),
        with_uuid("GetAssetParent", 0x060B00),
        with_uuid("GetCPLPackageURI", 0x060D00),
        // Ingest
        bare("IngestGetEventList", 0x070100),
        request("IngestGetEventInfo", 0x070300, vec![RequestField::int("event_id", 4)]),
        request(
            "IngestRemotePackingList",
            0x070500,
            vec![
                RequestField::ipv4("ftp_ip"),
                RequestField::int("ftp_port", 2),
                RequestField::text("username", 16),
                RequestField::text("password", 16),
                RequestField::cstring("path"),
            ],
        ),
        bare("IngestCancel", 0x070700),
        bare("IngestGetStatus", 0x070900),
        request("IngestAddJob", 0x070F00, vec![RequestField::document("xml")]),
        request("IngestCancelJob", 0x071700, vec![RequestField::int("job_id", 8)]),
        request("IngestGetJobProperties", 0x071B00, vec![RequestField::int("job_id", 8)]),
        request("IngestGetJobStatus", 0x071D00, vec![RequestField::int("job_id", 8)]),
        bare("IngestGetJobList", 0x072300),
        // Storage and SNMP
        bare("GetDataDiskSpaceUsage", 0x080100),
        request("SNMPGet", 0x080300, vec![RequestField::cstring("oid")]),
        // Macro and trigger cues
        bare("GetMacroCueList", 0x0A0100),
        with_uuid("GetMacroCueInfo", 0x0A0300),
        bare("GetTriggerCueList", 0x0A0500),
        with_uuid("GetTriggerCueInfo", 0x0A0700),
        request("ExecuteMacroCue", 0x0A0900, vec![RequestField::text("macro_name", 64)]),
        // Security manager log
        request(
            "GetSMLog",
            0x0C0100,
            vec![
                RequestField::int("strict_mode", 1),
                RequestField::int("filter_mask", 1),
                RequestField::int("event_id_min", 4),
                RequestField::int("event_id_max", 4),
                RequestField::int("start_timestamp", 8),
                RequestField::int("end_timestamp", 8),
                RequestField::uuid("cpl_id"),
                RequestField::uuid("kdm_id"),
            ],
        ),
        // Session
        bare("TerminateTLS", 0x0E0500),
        bare("WhoAmI", 0x0E0B00),
        // Device logs
        request(
            "GetLog",
            0x110100,
            vec![
                RequestField::text("database", 8),
                RequestField::int("idmin", 8),
                RequestField::int("idmax", 8),
            ],
        ),
        request("GetLogLastId", 0x110300, vec![RequestField::text("database", 8)]),
    ]
}

// =============================================================================
// Responses
// =============================================================================

/// Every built-in response layout
pub fn response_definitions() -> Vec<ResponseDefinition> {
    let mut cpl_info = cpl_info_head();
    cpl_info.extend([uuids("crypto_key_id_list", 176, -1), status()]);

    let mut cpl_info2 = cpl_info_head();
    cpl_info2.extend([
        uuids("crypto_key_id_list", 176, -55),
        coded("schemas", -55, -54, SCHEMAS),
        coded("stream_type", -54, -53, STREAM_TYPE),
        int("complete", -53, -52),
        int("frame_per_edit", -52, -51),
        int("reserved2", -51, -49),
        int("frame_rate_a", -49, -45),
        int("frame_rate_b", -45, -41),
        int("sound_sample_rate_a", -41, -37),
        int("sound_sample_rate_b", -37, -33),
        int("sound_sampling_rate_a", -33, -29),
        int("sound_sampling_rate_b", -29, -25),
        uuid("content_version_id", -25, -9),
        int("properties1", -9, -5),
        int("unknown_field", -5, -1),
        status(),
    ]);

    let mut kdm_info = kdm_info_head();
    kdm_info.extend([uuids("key_id_list", 56, -1), status()]);

    let mut kdm_info2 = kdm_info_head();
    kdm_info2.extend([
        uuids("key_id_list", 56, -293),
        int("forensic_picture_disable", -293, -292),
        int("forensic_audio_disable", -292, -291),
        int("reserved0", -291, -290),
        int("content_authenticator_length", -290, -289),
        text("content_authenticator", -289, -257),
        text("x509_subject_name", -257, -1),
        status(),
    ]);

    let mut status_spl = playback_status();
    status_spl.push(status());

    let mut status_spl2 = playback_status();
    status_spl2.extend([
        int("flags", 81, 85),
        int("element_edit_rate_numerator", 85, 87),
        int("element_edit_rate_denominator", 87, 89),
        int("element_edit_position", 89, 93),
        int("element_edit_duration", 93, 97),
        int("element_frames", 97, 99),
        uuid("key_id", 99, 115),
        status(),
    ]);

    vec![
        // CPL
        response("GetCPLList", 0x010200, uuid_list()),
        response("GetCPLInfo", 0x010400, cpl_info),
        response("GetCPLInfo2", 0x010401, cpl_info2),
        response("DeleteCPL", 0x010600, ack()),
        response("RetrieveCPL", 0x010800, document("xml")),
        response("StoreCPL", 0x010A00, ack()),
        response(
            "ValidateCPL",
            0x010C00,
            vec![
                int("result", 0, 1),
                coded("error_code", 1, 2, VALIDATION_ERROR),
                text("error_message", 2, -1),
                status(),
            ],
        ),
        response("GetCPLSize", 0x010E00, vec![int("size", 0, 8), status()]),
        response(
            "GetCPLMarker",
            0x011000,
            vec![
                ResponseBatch::new(
                    "markers",
                    0,
                    Some(-1),
                    vec![text("label", 0, 16), int("offset", 16, 20)],
                )
                .into(),
                status(),
            ],
        ),
        response(
            "GetCPLPlayStat",
            0x011200,
            vec![
                int("error_code", 0, 4),
                ResponseBatch::new(
                    "markers",
                    4,
                    Some(-1),
                    vec![uuid("uuid", 0, 16), text("last_play", 16, 48)],
                )
                .into(),
            ],
        ),
        // KDM
        response("GetKDMList", 0x020200, uuid_list()),
        response("GetKDMInfo", 0x020400, kdm_info),
        response("GetKDMInfo2", 0x020401, kdm_info2),
        response("DeleteKDM", 0x020600, ack()),
        response("RetrieveKDM", 0x020800, document("xml")),
        response("StoreKDM", 0x020A00, ack()).with_timeout(STORE_KDM_TIMEOUT),
        // SPL
        response("GetSPLList", 0x030200, uuid_list()),
        response(
            "GetSPLInfo",
            0x030400,
            vec![
                uuid("spl_uuid", 0, 16),
                text("name", 16, 144),
                int("duration", 144, 148),
                status(),
            ],
        ),
        response("DeleteSPL", 0x030600, ack()),
        response("LoadSPLByUUID", 0x030A00, ack()),
        response("PlaySPL", 0x030C00, ack()),
        response("PauseSPL", 0x030E00, ack()),
        response("EjectSPL", 0x031000, ack()),
        response("SkipForward", 0x031200, ack()),
        response("SkipBackward", 0x031400, ack()),
        response("JumpForward", 0x031600, ack()),
        response("JumpBackward", 0x031800, ack()),
        response("LoopModeSPL", 0x031A00, ack()),
        response("StatusSPL", 0x031C00, status_spl),
        response("StatusSPL2", 0x031C01, status_spl2),
        response("RetrieveSPL", 0x031E00, document("xml")),
        response("StoreSPL", 0x032000, ack()),
        response("SkipToEvent", 0x032200, ack()),
        response(
            "GetLoopModeSPL",
            0x032400,
            vec![coded("loop_mode", 0, 1, LOOP_MODE), status()],
        ),
        response(
            "ValidateSPL",
            0x032600,
            vec![
                int("result", 0, 1),
                coded("error_code", 1, 2, VALIDATION_ERROR),
                uuid("cpl_id", 2, 18),
                text("error_message", 18, -1),
                status(),
            ],
        ),
        response(
            "GetShowElementStatus",
            0x032C00,
            vec![
                int("item_number", 0, 4),
                int("item_length", 4, 8),
                uuid("show_element_id", 8, 24),
                ResponseField::new("status", -1, None, Decoder::Int)
                    .with_text(SHOW_ELEMENT_STATUS)
                    .into(),
            ],
        ),
        response(
            "CheckSPLLoadProgress",
            0x033200,
            vec![
                int("error", 0, 4),
                int("progress", 4, 8),
                int("progress_total", 8, 12),
                text("description", 12, -1),
                status(),
            ],
        ),
        // Scheduler
        response("AddSchedule", 0x040200, vec![int("schedule_id", 0, 8), status()]),
        response("AddSchedule2", 0x040201, vec![int("schedule_id", 0, 8), status()]),
        response("DeleteSchedule", 0x040400, ack()),
        response(
            "GetScheduleList",
            0x040600,
            vec![
                at("schedule_list", 0, -1, Decoder::IntListLe { width: 8 }),
                status(),
            ],
        ),
        response(
            "GetScheduleInfo",
            0x040800,
            vec![
                int("id", 0, 8),
                uuid("spl_id", 8, 24),
                int("time_begin", 24, 32),
                int("time_end", 32, 40),
                coded("status", 40, 41, SCHEDULE_STATUS),
                text("annotation_text", 41, 169),
                status(),
            ],
        ),
        response(
            "GetScheduleInfo2",
            0x040801,
            vec![
                int("id", 0, 8),
                uuid("spl_id", 8, 24),
                text("time_begin", 24, 56),
                int("spl_duration", 56, 60),
                coded("status", 60, 61, SCHEDULE_STATUS_V2),
                int("flags", 60, 68),
                coded("loop_mode", 60, 68, LOOP_MODE),
                text("annotation_text", 68, 196),
                status(),
            ],
        ),
        response("GetCurrentSchedule", 0x040A00, vec![int("id", 0, 8), status()]),
        response("GetNextSchedule", 0x040C00, vec![int("id", 0, 8), status()]),
        response("SetSchedulerEnable", 0x040E00, ack()),
        response(
            "GetSchedulerEnable",
            0x041000,
            vec![at("enabled", 0, 1, Decoder::Bool), status()],
        ),
        // Product
        response(
            "GetProductInfo",
            0x050200,
            vec![
                text("product_name", 0, 16),
                text("product_serial", 16, 32),
                uuid("product_id", 32, 48),
                int("software_version_major", 48, 49),
                int("software_version_minor", 49, 50),
                int("software_version_revision", 50, 51),
                int("software_version_build", 51, 52),
                int("hardware_version_major", 52, 53),
                int("hardware_version_minor", 53, 54),
                int("hardware_version_build", 54, 55),
                int("hardware_version_extra", 55, 56),
            ],
        ),
        response("GetProductCertificate", 0x050400, document("certificate")),
        response(
            "GetAPIProtocolVersion",
            0x050600,
            vec![
                int("version_major", 0, 1),
                int("version_minor", 1, 2),
                int("version_build", 2, 3),
            ],
        ),
        response("GetTimeUTC", 0x050800, vec![int("utc_time", 0, 8), status()]),
        response("GetTimeZone", 0x052000, document("timezone")),
        // Assets
        response("GetAssetList", 0x060200, uuid_list()),
        response(
            "GetAssetInfo",
            0x060400,
            vec![
                uuid("asset_id", 0, 16),
                text("mime_type", 16, 80),
                coded("storage", 80, 81, STORAGE),
                status(),
            ],
        ),
        response("RetrieveAssetXML", 0x060600, document("file_data")),
        response(
            "GetAssetURL",
            0x060A00,
            vec![uuid("asset_id", 0, 16), text("url", 16, -1), status()],
        ),
        response(
            "GetAssetParent",
            0x060C00,
            vec![
                uuid("asset_id", 0, 16),
                uuid("asset_map_id", 16, 32),
                uuid("packing_list_id", 32, 48),
                status(),
            ],
        ),
        response(
            "GetCPLPackageURI",
            0x060E00,
            vec![
                int("error_code", 0, 4),
                int("flags", 4, 8),
                text("uri", 8, -1),
                status(),
            ],
        ),
        // Ingest
        response(
            "IngestGetEventList",
            0x070200,
            vec![
                at("event_list", 0, -1, Decoder::IntListLe { width: 4 }),
                status(),
            ],
        ),
        response(
            "IngestGetEventInfo",
            0x070400,
            vec![int("event_id", 0, 4), text("event_text", 4, -1), status()],
        ),
        response("IngestRemotePackingList", 0x070600, ack()),
        response("IngestCancel", 0x070800, ack()),
        response(
            "IngestGetStatus",
            0x070A00,
            vec![
                at("is_running", 0, 1, Decoder::Bool),
                int("error_count", 1, 3),
                int("warning_count", 3, 5),
                int("last_event_id", 5, 9),
                int("current_process_percent", 9, 10),
                int("all_processes_percent", 10, 11),
                text("current_process_description", 11, -1),
                status(),
            ],
        ),
        response("IngestAddJob", 0x071000, vec![int("transfer_id", 0, 8), status()]),
        response("IngestCancelJob", 0x071800, ack()),
        response("IngestGetJobProperties", 0x071C00, document("xml")),
        response(
            "IngestGetJobStatus",
            0x071E00,
            vec![
                int("error_count", 0, 4),
                int("warning_count", 4, 8),
                int("event_count", 8, 12),
                coded("status", 12, 16, JOB_STATUS),
                int("download_progress", 16, 20),
                int("process_progress", 20, 24),
                int("actions", 24, 28),
                text("title", 28, -1),
                status(),
            ],
        ),
        response(
            "IngestGetJobList",
            0x072400,
            vec![
                ResponseBatch::new(
                    "job_list",
                    0,
                    Some(-1),
                    vec![
                        int("job_id", 0, 8),
                        int("event_count", 8, 10),
                        coded("job_status", 10, 11, JOB_STATUS),
                        int("reserved", 11, 12),
                    ],
                )
                .into(),
                status(),
            ],
        ),
        // Storage and SNMP
        response(
            "GetDataDiskSpaceUsage",
            0x080200,
            vec![
                int("total_size", 0, 8),
                int("used", 8, 16),
                int("available", 16, 24),
                status(),
            ],
        ),
        response("SNMPGet", 0x080400, document("value")),
        // Macro and trigger cues
        response("GetMacroCueList", 0x0A0200, uuid_list()),
        response(
            "GetMacroCueInfo",
            0x0A0400,
            vec![
                uuid("macro_id", 0, 16),
                text("name", 16, 80),
                int("duration", 80, 84),
                status(),
            ],
        ),
        response("GetTriggerCueList", 0x0A0600, uuid_list()),
        response(
            "GetTriggerCueInfo",
            0x0A0800,
            vec![uuid("trigger_id", 0, 16), text("name", 16, 80), status()],
        ),
        response(
            "ExecuteMacroCue",
            0x0A0A00,
            vec![coded("error_code", 0, 1, MACRO_EXECUTION), status()],
        ),
        // Security manager log
        response(
            "GetSMLog",
            0x0C0200,
            vec![int("error_code", 0, 1), text("xml", 1, -1), status()],
        ),
        // Session
        response("TerminateTLS", 0x0E0600, ack()),
        response(
            "WhoAmI",
            0x0E0C00,
            vec![text("username", 0, 16), int("dci_level", 16, -1), status()],
        ),
        // Device logs
        response(
            "GetLog",
            0x110200,
            vec![
                int("errorcode", 0, 1),
                int("reserved0", 1, 1),
                int("reserved1", 2, 2),
                text("xml", 4, -1),
                status(),
            ],
        ),
        response(
            "GetLogLastId",
            0x110400,
            vec![
                int("errorcode", 0, 1),
                int("reserved0", 1, 1),
                int("reserved1", 2, 2),
                int("last_id", 4, -1),
                status(),
            ],
        ),
    ]
}
