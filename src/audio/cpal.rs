//! Real audio devices using CPAL (Cross-Platform Audio Library).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::backend::{AudioBackendConfig, AudioFrame, Microphone};
use super::chunk::PlanarBuffer;
use super::playback::{AudioOutput, VoiceId};
use crate::error::{Result, VoiceError};

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: the stream is only touched through `&mut self` or a Mutex, never
/// from two threads at once; its callbacks run on cpal's own thread.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

fn find_input_device(name: Option<&str>) -> Result<cpal::Device> {
    let host = cpal::default_host();

    match name {
        Some(name) => {
            let devices = host
                .input_devices()
                .map_err(|e| VoiceError::device(format!("Failed to enumerate input devices: {}", e)))?;
            for device in devices {
                if device.name().map(|n| n == name).unwrap_or(false) {
                    return Ok(device);
                }
            }
            Err(VoiceError::device(format!("Input device not found: {}", name)))
        }
        None => host
            .default_input_device()
            .ok_or_else(|| VoiceError::device("No default input device")),
    }
}

fn find_output_device(name: Option<&str>) -> Result<cpal::Device> {
    let host = cpal::default_host();

    match name {
        Some(name) => {
            let devices = host
                .output_devices()
                .map_err(|e| VoiceError::device(format!("Failed to enumerate output devices: {}", e)))?;
            for device in devices {
                if device.name().map(|n| n == name).unwrap_or(false) {
                    return Ok(device);
                }
            }
            Err(VoiceError::device(format!("Output device not found: {}", name)))
        }
        None => host
            .default_output_device()
            .ok_or_else(|| VoiceError::device("No default output device")),
    }
}

// ============================================================================
// Microphone
// ============================================================================

/// Microphone capture at the session capture rate (16kHz mono)
///
/// The device is opened in `start()` and dropped in `stop()`.
pub struct CpalMicrophone {
    config: AudioBackendConfig,
    stream: Mutex<Option<SendableStream>>,
    capturing: AtomicBool,
    name: String,
}

impl CpalMicrophone {
    pub fn new(config: AudioBackendConfig) -> Result<Self> {
        let name = config
            .input_device
            .clone()
            .unwrap_or_else(|| "default input".to_string());

        Ok(Self {
            config,
            stream: Mutex::new(None),
            capturing: AtomicBool::new(false),
            name,
        })
    }

    /// Build the input stream, preferring f32 and falling back to i16
    fn build_stream(
        &self,
        device: &cpal::Device,
        tx: mpsc::Sender<AudioFrame>,
    ) -> Result<cpal::Stream> {
        let stream_config = cpal::StreamConfig {
            channels: self.config.channels,
            sample_rate: cpal::SampleRate(self.config.capture_sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let err_callback = |err| {
            error!("Input stream error: {}", err);
        };

        let mut blocker = Blocker::new(
            tx.clone(),
            self.config.capture_block_frames as usize * self.config.channels as usize,
            self.config.capture_sample_rate,
            self.config.channels,
        );
        if let Ok(stream) = device.build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| blocker.push(data.iter().copied()),
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        let mut blocker = Blocker::new(
            tx,
            self.config.capture_block_frames as usize * self.config.channels as usize,
            self.config.capture_sample_rate,
            self.config.channels,
        );
        device
            .build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    blocker.push(data.iter().map(|&s| s as f32 / 32768.0))
                },
                err_callback,
                None,
            )
            .map_err(|e| {
                VoiceError::device(format!(
                    "Failed to open microphone at {}Hz/{}ch: {}",
                    self.config.capture_sample_rate, self.config.channels, e
                ))
            })
    }
}

/// Groups callback samples into fixed-size blocks
struct Blocker {
    tx: mpsc::Sender<AudioFrame>,
    pending: Vec<f32>,
    block_len: usize,
    sample_rate: u32,
    channels: u16,
    started: Instant,
}

impl Blocker {
    fn new(tx: mpsc::Sender<AudioFrame>, block_len: usize, sample_rate: u32, channels: u16) -> Self {
        Self {
            tx,
            pending: Vec::with_capacity(block_len),
            block_len: block_len.max(1),
            sample_rate,
            channels,
            started: Instant::now(),
        }
    }

    fn push(&mut self, samples: impl Iterator<Item = f32>) {
        for sample in samples {
            self.pending.push(sample);
            if self.pending.len() == self.block_len {
                let block = std::mem::replace(&mut self.pending, Vec::with_capacity(self.block_len));
                let frame = AudioFrame {
                    samples: block,
                    sample_rate: self.sample_rate,
                    channels: self.channels,
                    timestamp_ms: self.started.elapsed().as_millis() as u64,
                };
                // Non-blocking: the receiver may already be gone during stop()
                if let Err(e) = self.tx.try_send(frame) {
                    debug!("Dropping captured block: {}", e);
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl Microphone for CpalMicrophone {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        if self.capturing.load(Ordering::SeqCst) {
            return Err(VoiceError::device("Microphone already capturing"));
        }

        let device = find_input_device(self.config.input_device.as_deref())?;
        if let Ok(name) = device.name() {
            self.name = name;
        }

        let (tx, rx) = mpsc::channel(64);
        let stream = self.build_stream(&device, tx)?;
        stream
            .play()
            .map_err(|e| VoiceError::device(format!("Failed to start microphone: {}", e)))?;

        let mut guard = self
            .stream
            .lock()
            .map_err(|e| VoiceError::device(format!("Failed to lock stream: {}", e)))?;
        *guard = Some(SendableStream(stream));
        self.capturing.store(true, Ordering::SeqCst);

        info!(
            "Microphone {} acquired ({}Hz, {} channels)",
            self.name, self.config.capture_sample_rate, self.config.channels
        );

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        let stream = {
            let mut guard = self
                .stream
                .lock()
                .map_err(|e| VoiceError::device(format!("Failed to lock stream: {}", e)))?;
            guard.take()
        };

        if let Some(SendableStream(stream)) = stream {
            if let Err(e) = stream.pause() {
                warn!("Failed to pause microphone stream: {}", e);
            }
            drop(stream);
            info!("Microphone {} released", self.name);
        }

        self.capturing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Speaker output
// ============================================================================

struct Voice {
    id: VoiceId,
    start_frame: u64,
    samples: Vec<f32>,
}

impl Voice {
    fn end_frame(&self) -> u64 {
        self.start_frame + self.samples.len() as u64
    }
}

#[derive(Default)]
struct MixState {
    /// Frames rendered since the stream opened
    position: u64,
    voices: Vec<Voice>,
    finished: Vec<VoiceId>,
}

impl MixState {
    fn render(&mut self, data: &mut [f32], channels: usize) {
        data.fill(0.0);
        let frames = (data.len() / channels) as u64;
        let window_start = self.position;
        let window_end = window_start + frames;

        for voice in &self.voices {
            let from = voice.start_frame.max(window_start);
            let to = voice.end_frame().min(window_end);
            for frame in from..to {
                let sample = voice.samples[(frame - voice.start_frame) as usize];
                let offset = (frame - window_start) as usize * channels;
                for slot in &mut data[offset..offset + channels] {
                    *slot += sample;
                }
            }
        }

        for slot in data.iter_mut() {
            *slot = slot.clamp(-1.0, 1.0);
        }

        self.position = window_end;
        let finished = &mut self.finished;
        self.voices.retain(|voice| {
            if voice.end_frame() <= window_end {
                finished.push(voice.id);
                false
            } else {
                true
            }
        });
    }
}

/// Speaker output with a sample-accurate clock
///
/// The stream stays open for the lifetime of the output; scheduled voices
/// are mixed into it at their start frame.
pub struct CpalOutput {
    state: Arc<Mutex<MixState>>,
    _stream: SendableStream,
    device_rate: u32,
    next_id: VoiceId,
    name: String,
}

impl CpalOutput {
    pub fn new(config: AudioBackendConfig) -> Result<Self> {
        let device = find_output_device(config.output_device.as_deref())?;
        let name = device.name().unwrap_or_else(|_| "default output".to_string());

        let preferred = cpal::StreamConfig {
            channels: config.channels,
            sample_rate: cpal::SampleRate(config.playback_sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let state = Arc::new(Mutex::new(MixState::default()));

        let (stream, stream_config) = match Self::build_stream(&device, &preferred, &state) {
            Ok(stream) => (stream, preferred),
            Err(e) => {
                // Fall back to the device's native format and resample in software
                debug!("Preferred output format rejected: {}", e);
                let native: cpal::StreamConfig = device
                    .default_output_config()
                    .map_err(|e| VoiceError::device(format!("Failed to query output config: {}", e)))?
                    .into();
                let stream = Self::build_stream(&device, &native, &state)?;
                (stream, native)
            }
        };

        stream
            .play()
            .map_err(|e| VoiceError::device(format!("Failed to start output stream: {}", e)))?;

        info!(
            "Speaker {} opened ({}Hz, {} channels)",
            name, stream_config.sample_rate.0, stream_config.channels
        );

        Ok(Self {
            state,
            _stream: SendableStream(stream),
            device_rate: stream_config.sample_rate.0,
            next_id: 0,
            name,
        })
    }

    fn build_stream(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        state: &Arc<Mutex<MixState>>,
    ) -> Result<cpal::Stream> {
        let channels = config.channels as usize;
        let state = Arc::clone(state);

        device
            .build_output_stream(
                config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if let Ok(mut state) = state.lock() {
                        state.render(data, channels);
                    } else {
                        data.fill(0.0);
                    }
                },
                |err| error!("Output stream error: {}", err),
                None,
            )
            .map_err(|e| VoiceError::device(format!("Failed to open output stream: {}", e)))
    }
}

/// Mix planar channels down to mono and resample linearly to `target_rate`
fn to_device_mono(buffer: &PlanarBuffer, target_rate: u32) -> Vec<f32> {
    let frames = buffer.frames();
    let channel_count = buffer.channels.len().max(1) as f32;
    let mono: Vec<f32> = (0..frames)
        .map(|i| buffer.channels.iter().map(|c| c[i]).sum::<f32>() / channel_count)
        .collect();

    if buffer.sample_rate == target_rate || mono.is_empty() {
        return mono;
    }

    let ratio = buffer.sample_rate as f64 / target_rate as f64;
    let out_len = (mono.len() as f64 / ratio).round() as usize;
    (0..out_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = pos.floor() as usize;
            let frac = (pos - idx as f64) as f32;
            let a = mono[idx.min(mono.len() - 1)];
            let b = mono[(idx + 1).min(mono.len() - 1)];
            a + (b - a) * frac
        })
        .collect()
}

impl AudioOutput for CpalOutput {
    fn current_time(&self) -> f64 {
        match self.state.lock() {
            Ok(state) => state.position as f64 / self.device_rate as f64,
            Err(_) => 0.0,
        }
    }

    fn schedule(&mut self, buffer: PlanarBuffer, start_at: f64) -> Result<VoiceId> {
        let samples = to_device_mono(&buffer, self.device_rate);
        self.next_id += 1;
        let voice = Voice {
            id: self.next_id,
            start_frame: (start_at * self.device_rate as f64).round() as u64,
            samples,
        };

        let mut state = self
            .state
            .lock()
            .map_err(|e| VoiceError::device(format!("Failed to lock mixer: {}", e)))?;
        state.voices.push(voice);

        Ok(self.next_id)
    }

    fn stop(&mut self, voice: VoiceId) {
        if let Ok(mut state) = self.state.lock() {
            state.voices.retain(|v| v.id != voice);
        }
    }

    fn drain_finished(&mut self) -> Vec<VoiceId> {
        match self.state.lock() {
            Ok(mut state) => std::mem::take(&mut state.finished),
            Err(_) => Vec::new(),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
