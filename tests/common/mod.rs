#![allow(dead_code)]

use proto_bridge::{ProtoBridge, TypeRegistry};
use pyo3::prelude::*;
use std::sync::Arc;

#[derive(Clone, PartialEq, prost::Message)]
pub struct TaskId {
    #[prost(string, tag = "1")]
    pub value: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct TaskInfo {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub task_id: Option<TaskId>,
    #[prost(bytes = "vec", tag = "6")]
    pub data: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum TaskState {
    Staging = 0,
    Running = 1,
    Finished = 2,
    Failed = 3,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct TaskStatus {
    #[prost(message, optional, tag = "1")]
    pub task_id: Option<TaskId>,
    #[prost(enumeration = "TaskState", tag = "2")]
    pub state: i32,
    #[prost(string, tag = "4")]
    pub message: String,
}

/// Generated-code stand-in: a tiny pure-Python protobuf codec covering the
/// field kinds used above, so tests can inspect fields from the Python side.
pub const TASK_PB2: &str = r#"
def _varint(n):
    out = bytearray()
    while True:
        bits = n & 0x7F
        n >>= 7
        if n:
            out.append(bits | 0x80)
        else:
            out.append(bits)
            return bytes(out)


def _read_varint(buf, pos):
    result = shift = 0
    while True:
        if pos >= len(buf):
            raise ValueError("truncated varint")
        b = buf[pos]
        pos += 1
        result |= (b & 0x7F) << shift
        if not b & 0x80:
            return result, pos
        shift += 7


def _default(kind):
    if kind == "string":
        return ""
    if kind == "bytes":
        return b""
    if kind == "enum":
        return 0
    return None


class Message:
    FIELDS = {}

    def __init__(self, **kwargs):
        for name, kind in self.FIELDS.values():
            setattr(self, name, kwargs.get(name, _default(kind)))

    @classmethod
    def FromString(cls, data):
        msg = cls()
        data = bytes(data)
        pos = 0
        while pos < len(data):
            key, pos = _read_varint(data, pos)
            tag, wire = key >> 3, key & 7
            if wire == 0:
                value, pos = _read_varint(data, pos)
            elif wire == 2:
                size, pos = _read_varint(data, pos)
                if pos + size > len(data):
                    raise ValueError("truncated field %d" % tag)
                value = data[pos:pos + size]
                pos += size
            else:
                raise ValueError("unsupported wire type %d" % wire)
            if tag not in cls.FIELDS:
                continue
            name, kind = cls.FIELDS[tag]
            if kind == "string":
                value = value.decode("utf-8")
            elif isinstance(kind, type):
                value = kind.FromString(value)
            setattr(msg, name, value)
        return msg

    def SerializeToString(self):
        out = bytearray()
        for tag in sorted(self.FIELDS):
            name, kind = self.FIELDS[tag]
            value = getattr(self, name)
            if value is None or (not isinstance(kind, type) and value == _default(kind)):
                continue
            if kind == "enum":
                out += _varint(tag << 3) + _varint(value)
                continue
            if kind == "string":
                payload = value.encode("utf-8")
            elif kind == "bytes":
                payload = bytes(value)
            else:
                payload = value.SerializeToString()
            out += _varint(tag << 3 | 2) + _varint(len(payload)) + payload
        return bytes(out)


class TaskID(Message):
    FIELDS = {1: ("value", "string")}


class TaskInfo(Message):
    FIELDS = {1: ("name", "string"), 2: ("task_id", TaskID), 6: ("data", "bytes")}


class TaskStatus(Message):
    FIELDS = {1: ("task_id", TaskID), 2: ("state", "enum"), 4: ("message", "string")}


TASK_RUNNING = 1
DESCRIPTOR = object()
"#;

pub fn load_task_pb2(py: Python<'_>) -> Bound<'_, PyModule> {
    PyModule::from_code_bound(py, TASK_PB2, "task_pb2.py", "task_pb2").expect("task_pb2 compiles")
}

pub fn task_registry(py: Python<'_>) -> Arc<TypeRegistry> {
    Arc::new(TypeRegistry::with_module(&load_task_pb2(py)))
}

pub fn task_bridge(py: Python<'_>) -> ProtoBridge {
    ProtoBridge::new(task_registry(py))
}

pub fn sleep_task() -> TaskInfo {
    TaskInfo {
        name: "sleep".to_string(),
        task_id: Some(TaskId {
            value: "1".to_string(),
        }),
        data: Vec::new(),
    }
}
