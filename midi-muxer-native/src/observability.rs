//! Canonical structured event names used by the native port source.

pub mod events {
    // Port enumeration and source lifecycle.
    pub const SOURCE_ENUMERATE_OK: &str = "native_source_enumerate_ok";
    pub const SOURCE_ENUMERATE_FAILED: &str = "native_source_enumerate_failed";
    pub const SOURCE_CLOSE: &str = "native_source_close";

    // Input connection threads.
    pub const INPUT_CONNECT_OK: &str = "native_input_connect_ok";
    pub const INPUT_CONNECT_FAILED: &str = "native_input_connect_failed";
    pub const INPUT_DISCONNECT: &str = "native_input_disconnect";
    pub const INPUT_MESSAGE_EMPTY: &str = "native_input_message_empty";

    // Output writer threads.
    pub const OUTPUT_CONNECT_OK: &str = "native_output_connect_ok";
    pub const OUTPUT_CONNECT_FAILED: &str = "native_output_connect_failed";
    pub const OUTPUT_WRITE_FAILED: &str = "native_output_write_failed";
    pub const OUTPUT_WRITER_CLOSED: &str = "native_output_writer_closed";

    pub const THREAD_SPAWN_FAILED: &str = "native_thread_spawn_failed";
}
